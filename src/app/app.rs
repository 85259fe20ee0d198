//! Main application controller
//!
//! Wires the configured exporter and emailer into a session and drives it
//! from the terminal: draw, poll finished tasks, handle the next event.

use crate::{
    app::{
        session::Session,
        tui::{Tui, TuiEvent},
    },
    config::AppConfig,
    mail::{EmailJsTransport, Emailer},
    ticket::{HttpImageFetcher, TicketExporter},
    Result,
};
use std::io;
use tracing::info;

/// TUI application controller
pub struct App {
    /// Terminal UI handler
    tui: Tui,
    /// Flow state and screens
    session: Session<HttpImageFetcher, EmailJsTransport>,
}

impl App {
    /// Create a new application instance from loaded configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let fetcher = HttpImageFetcher::new(config.fetch_timeout())?;
        let exporter = TicketExporter::new(fetcher, config.resolved_download_dir());
        let emailer = EmailJsTransport::new(config.fetch_timeout())
            .and_then(|transport| Emailer::new(&config.email, transport, config.max_attachment_kb));

        Ok(Self {
            tui: Tui::new()?,
            session: Session::new(&config, exporter, emailer),
        })
    }

    /// Initialize the terminal
    pub fn init(&mut self) -> Result<()> {
        self.tui.init()?;
        Ok(())
    }

    /// Run the main application loop
    pub async fn run(&mut self) -> Result<()> {
        info!("flow started");
        while !self.session.should_quit() {
            self.session.poll_tasks();
            self.draw()?;
            self.handle_events()?;
        }
        info!(step = ?self.session.step(), "flow ended");
        Ok(())
    }

    /// Restore the terminal
    pub fn restore(&mut self) -> Result<()> {
        self.tui.restore()?;
        Ok(())
    }

    fn draw(&mut self) -> io::Result<()> {
        let session = &mut self.session;
        self.tui.draw(|f| session.draw(f))
    }

    fn handle_events(&mut self) -> Result<()> {
        match self.tui.next_event()? {
            Some(TuiEvent::Key(key)) => self.session.handle_key(key),
            Some(TuiEvent::Tick) => self.session.tick(),
            // The next draw picks up the new size
            Some(TuiEvent::Resize(..)) | None => {}
        }
        Ok(())
    }
}
