//! CLI commands

mod archs;
mod completions;
mod info;
mod licenses;
mod list;
mod plan;
mod run;

pub use archs::ArchsCommand;
pub use completions::CompletionsCommand;
pub use info::InfoCommand;
pub use licenses::LicensesCommand;
pub use list::ListCommand;
pub use plan::PlanCommand;
pub use run::RunCommand;
