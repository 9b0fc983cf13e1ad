//! Command handlers.

mod plan;
mod run;

pub(crate) use plan::handle_plan;
pub(crate) use run::handle_run;
