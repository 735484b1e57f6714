use super::{app_helper, Command};
use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use crustadf::{
    adf::{Argument, ArgumentSet},
    interpretation::{Interpretation, InterpretationIterator, TwoValuedInterpretationIterator},
};
use log::info;
use std::collections::HashSet;

const CMD_NAME: &str = "enumerate";

const ARG_ARGUMENTS: &str = "ARGUMENTS";
const ARG_TWO_VALUED: &str = "TWO_VALUED";
const ARG_FRAMEWORK: &str = "FRAMEWORK";

pub(crate) struct EnumerateCommand;

impl EnumerateCommand {
    pub(crate) fn new() -> Self {
        EnumerateCommand
    }
}

fn comma_separated(arg_matches: &ArgMatches<'_>, arg: &str) -> Option<Vec<String>> {
    arg_matches.value_of(arg).map(|v| {
        v.split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    })
}

impl<'a> Command<'a> for EnumerateCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Prints the interpretations over a list of arguments")
            .setting(AppSettings::DisableVersion)
            .arg(
                Arg::with_name(ARG_ARGUMENTS)
                    .short("a")
                    .long("arguments")
                    .empty_values(false)
                    .multiple(false)
                    .help("the comma-separated list of arguments")
                    .required(true),
            )
            .arg(
                Arg::with_name(ARG_TWO_VALUED)
                    .long("two-valued")
                    .takes_value(false)
                    .help("only prints the interpretations without undecided arguments")
                    .conflicts_with(ARG_FRAMEWORK),
            )
            .arg(
                Arg::with_name(ARG_FRAMEWORK)
                    .long("framework")
                    .empty_values(false)
                    .multiple(false)
                    .help("the comma-separated arguments of a framework, in which the other arguments are undecided")
                    .required(false),
            )
            .arg(app_helper::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let names = comma_separated(arg_matches, ARG_ARGUMENTS)
            .ok_or_else(|| anyhow!("missing arguments"))?;
        let arguments = names
            .iter()
            .map(|n| Argument::new(n))
            .collect::<Vec<Argument>>();
        let iterator: Box<dyn Iterator<Item = Interpretation>> =
            if let Some(framework_names) = comma_separated(arg_matches, ARG_FRAMEWORK) {
                let framework = ArgumentSet::new_with_names(&framework_names);
                if let Some(a) = arguments.iter().find(|a| !framework.contains(a)) {
                    return Err(anyhow!(
                        "the argument {} does not belong to the framework",
                        a
                    ));
                }
                Box::new(Interpretation::partials(&arguments, &framework))
            } else if arg_matches.is_present(ARG_TWO_VALUED) {
                let n_distinct = arguments.iter().collect::<HashSet<_>>().len();
                if n_distinct >= usize::BITS as usize {
                    return Err(anyhow!("too many arguments ({})", n_distinct));
                }
                Box::new(TwoValuedInterpretationIterator::new(&arguments))
            } else {
                Box::new(InterpretationIterator::new(&arguments))
            };
        let mut n = 0;
        for i in iterator {
            println!("{}", i);
            n += 1;
        }
        info!("printed {} interpretation(s)", n);
        Ok(())
    }
}
