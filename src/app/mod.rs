pub(crate) mod app_helper;
pub(crate) use app_helper::AppHelper;

mod check_backend_command;
pub(crate) use check_backend_command::CheckBackendCommand;

mod command;
pub(crate) use command::Command;

pub(crate) mod common;

mod enumerate_command;
pub(crate) use enumerate_command::EnumerateCommand;
