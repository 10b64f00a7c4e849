pub mod ai;
pub mod catalog;
pub mod extract;
pub mod preview;
pub mod prompt;
pub mod recipe;
pub mod session;
pub mod settings;
pub mod workbench;

// Public library API - UI drivers (the CLI today) should only need these.
pub use ai::provider::AiProvider;
pub use extract::{extract_reply, GeneratedResult};
pub use prompt::{build_prompt, build_system_instruction, SessionInputs};
pub use recipe::{Block, BlockParams, BlockRole, Recipe};
pub use session::{Session, SessionError, SessionManager};
pub use settings::{Settings, SettingsManager};
pub use workbench::{Applied, Workbench, WorkbenchError};
