use super::{app_helper, common, Command};
use anyhow::{Context, Result};
use clap::{App, AppSettings, ArgMatches, SubCommand};
use crustadf::{
    adf::ArgumentSet,
    interpretation::{DefaultPropositionalMapping, Interpretation, PropositionalMapping},
    sat::{IncrementalSatSolver, Literal, SolverState},
};
use log::info;

const CMD_NAME: &str = "check-backend";

pub(crate) struct CheckBackendCommand;

impl CheckBackendCommand {
    pub(crate) fn new() -> Self {
        CheckBackendCommand
    }
}

impl<'a> Command<'a> for CheckBackendCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Solves sample problems through a pool of solver states to check a SAT backend")
            .setting(AppSettings::DisableVersion)
            .args(&common::backend_args())
            .args(&common::pool_args())
            .arg(app_helper::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let factory = common::create_sat_solver_factory(arg_matches)?;
        let pool = common::create_pool(arg_matches, factory)?;
        let framework = ArgumentSet::new_with_names(&["a", "b"]);
        let mapping = DefaultPropositionalMapping::new(&framework);
        let a = framework.get_argument("a")?;
        let b = framework.get_argument("b")?;
        let t_a = mapping.true_atom(a);
        let t_b = mapping.true_atom(b);
        let problems = vec![
            vec![],
            vec![t_a.positive()],
            vec![t_a.negative(), t_b.negative()],
        ];
        for assumptions in problems {
            let mut state = pool
                .create_state()
                .context("while taking a solver state from the pool")?;
            encode_sample(&mut state, &framework, &mapping);
            for l in assumptions.iter() {
                state.assume(l);
            }
            let description = if assumptions.is_empty() {
                "no assumption".to_string()
            } else {
                assumptions
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<String>>()
                    .join(" ")
            };
            match state.witness()? {
                Some(w) => println!(
                    "{}: {}",
                    description,
                    Interpretation::from_witness(&w, &mapping)?
                ),
                None => println!("{}: UNSAT", description),
            }
            state.close();
        }
        info!("{} solver state(s) still ready in the pool", pool.available());
        pool.close();
        Ok(())
    }
}

fn encode_sample<M>(state: &mut SolverState, framework: &ArgumentSet, mapping: &M)
where
    M: PropositionalMapping,
{
    for arg in framework.iter() {
        state.add(&[
            mapping.true_atom(arg).negative(),
            mapping.false_atom(arg).negative(),
        ]);
    }
    let args = framework.as_slice();
    state.add(&[
        Literal::from(mapping.true_atom(&args[0])),
        Literal::from(mapping.true_atom(&args[1])),
    ]);
    state.add(&[
        mapping.true_atom(&args[0]).negative(),
        mapping.false_atom(&args[1]).positive(),
    ]);
}
