use super::Command;
use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches};
use log::{error, info};
use std::{ffi::OsString, str::FromStr, sync::Once, time::SystemTime};

static LOGGER_INIT: Once = Once::new();

const ARG_LOGGING_LEVEL: &str = "LOGGING_LEVEL";

/// The argument setting the logging level, to be added to each command.
pub(crate) fn logging_level_cli_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name(ARG_LOGGING_LEVEL)
        .long("logging-level")
        .multiple(false)
        .default_value("info")
        .possible_values(&["trace", "debug", "info", "warn", "error", "off"])
        .help("set the minimal logging level")
}

/// Builds the app from its commands, parses the CLI arguments and runs the selected command.
///
/// If the command fails, the error chain is logged and the process exits with status 1.
pub(crate) struct AppHelper<'a> {
    app_name: &'a str,
    version: &'a str,
    author: &'a str,
    about: &'a str,
    commands: Vec<Box<dyn Command<'a>>>,
}

impl<'a> AppHelper<'a> {
    pub(crate) fn new(app_name: &'a str, version: &'a str, author: &'a str, about: &'a str) -> Self {
        AppHelper {
            app_name,
            version,
            author,
            about,
            commands: vec![],
        }
    }

    pub(crate) fn add_command(&mut self, command: Box<dyn Command<'a>>) {
        self.commands.push(command);
    }

    pub(crate) fn launch_app(self) {
        if let Err(e) = self.execute_app(std::env::args_os()) {
            error!("an error occurred: {}", e);
            e.chain()
                .skip(1)
                .for_each(|err| error!("caused by: {}", err));
            std::process::exit(1);
        }
    }

    fn execute_app<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let start_time = SystemTime::now();
        let mut app = App::new(self.app_name)
            .global_setting(AppSettings::DisableVersion)
            .global_setting(AppSettings::VersionlessSubcommands)
            .setting(AppSettings::SubcommandRequiredElseHelp)
            .version(self.version)
            .author(self.author)
            .about(self.about);
        for c in self.commands.iter() {
            app = app.subcommand(c.clap_subcommand());
        }
        match app.get_matches_from_safe(args) {
            Ok(matches) => {
                let (name, sub_matches) = matches.subcommand();
                let command = self
                    .commands
                    .iter()
                    .find(|c| c.name() == name)
                    .ok_or_else(|| anyhow!("no such command: {}", name))?;
                let sub_matches = sub_matches.ok_or_else(|| anyhow!("missing arguments"))?;
                init_logger_with_level(logging_level(sub_matches));
                info!("{} {}", self.app_name, self.version);
                command.execute(sub_matches)?;
                info!(
                    "exiting successfully after {:?}",
                    start_time.elapsed().unwrap_or_default()
                );
                Ok(())
            }
            Err(clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                message,
                ..
            }) => {
                init_logger_with_level(log::LevelFilter::Info);
                message.split('\n').for_each(|s| info!("{}", s));
                Ok(())
            }
            Err(e) => {
                init_logger_with_level(log::LevelFilter::Info);
                Err(anyhow!("{}", e.message))
            }
        }
    }
}

fn logging_level(arg_matches: &ArgMatches<'_>) -> log::LevelFilter {
    arg_matches
        .value_of(ARG_LOGGING_LEVEL)
        .and_then(|l| log::LevelFilter::from_str(l).ok())
        .unwrap_or(log::LevelFilter::Info)
}

pub(crate) fn init_logger_with_level(level: log::LevelFilter) {
    LOGGER_INIT.call_once(|| {
        let colors = fern::colors::ColoredLevelConfig::new().info(fern::colors::Color::Cyan);
        fern::Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "![{:5}] {} {}",
                    colors.color(record.level()),
                    chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                    message
                ))
            })
            .level(level)
            .chain(std::io::stderr())
            .apply()
            .unwrap_or(());
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::SubCommand;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    struct LocalCommand {
        executed: Arc<AtomicBool>,
    }

    impl<'a> Command<'a> for LocalCommand {
        fn name(&self) -> &str {
            "local_command_name"
        }

        fn clap_subcommand(&self) -> App<'a, 'a> {
            SubCommand::with_name("local_command_name")
                .about("local_command_about")
                .arg(Arg::with_name("kill").short("k"))
                .arg(logging_level_cli_arg())
        }

        fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
            self.executed.store(true, Ordering::SeqCst);
            if arg_matches.is_present("kill") {
                Err(anyhow!("foo"))
            } else {
                Ok(())
            }
        }
    }

    fn helper() -> (AppHelper<'static>, Arc<AtomicBool>) {
        let mut h = AppHelper::new("app", "0.0.0", "author", "about");
        let executed = Arc::new(AtomicBool::new(false));
        h.add_command(Box::new(LocalCommand {
            executed: Arc::clone(&executed),
        }));
        (h, executed)
    }

    #[test]
    fn test_no_args() {
        let (h, executed) = helper();
        h.execute_app(vec!["app", "--foo"]).unwrap_err();
        assert!(!executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_wrong_subcommand() {
        let (h, _) = helper();
        h.execute_app(vec!["app", "foo"]).unwrap_err();
    }

    #[test]
    fn test_subcommand_ok() {
        let (h, executed) = helper();
        h.execute_app(vec!["app", "local_command_name", "--logging-level", "off"])
            .unwrap();
        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_subcommand_err() {
        let (h, executed) = helper();
        assert_eq!(
            "foo",
            h.execute_app(vec!["app", "local_command_name", "-k"])
                .unwrap_err()
                .to_string()
        );
        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_help() {
        let (h, executed) = helper();
        h.execute_app(vec!["app", "local_command_name", "-h"])
            .unwrap();
        assert!(!executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_wrong_logging_level() {
        let (h, _) = helper();
        h.execute_app(vec!["app", "local_command_name", "--logging-level", "foo"])
            .unwrap_err();
    }
}
