// TUI module for the interactive gallery
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;
pub(crate) mod timestamps;

use anyhow::Result;
pub use app::App;
use terminal::TerminalManager;

use crate::api::ImageApi;
use crate::history::SharedHistory;

/// Run the interactive TUI until the user quits
///
/// Must be called from a multi-threaded tokio runtime: the event loop blocks
/// its worker while searches run on the others.
pub fn run_interactive<A: ImageApi + Clone>(api: A, history: SharedHistory) -> Result<()> {
    tokio::task::block_in_place(|| {
        let mut manager = TerminalManager::new()?;
        let mut app = App::new(api, history);

        let res = app.run(manager.terminal_mut());

        manager.restore()?;
        res
    })
}
