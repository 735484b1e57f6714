use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};
use crustadf::{
    pool::{Pool, PoolBuilder},
    sat::{
        BackendKind, CadicalSatSolver, ExternalSatSolver, IncrementalSatSolver, IpasirSatSolver,
        SatSolvingLogger,
    },
};
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};
use strum::VariantNames;

pub(crate) const ARG_BACKEND: &str = "BACKEND";
const ARG_CADICAL_CONFIG: &str = "CADICAL_CONFIG";
const ARG_EXTERNAL_SAT_SOLVER: &str = "EXTERNAL_SAT_SOLVER";
const ARG_EXTERNAL_SAT_SOLVER_OPTIONS: &str = "EXTERNAL_SAT_SOLVER_OPTIONS";
const ARG_IPASIR_LIBRARY: &str = "IPASIR_LIBRARY";

pub(crate) fn backend_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_BACKEND)
            .long("backend")
            .empty_values(false)
            .multiple(false)
            .possible_values(BackendKind::VARIANTS)
            .default_value("cadical")
            .help("the kind of SAT solver to use")
            .required(false),
        Arg::with_name(ARG_CADICAL_CONFIG)
            .long("cadical-config")
            .empty_values(false)
            .multiple(false)
            .possible_values(&["default", "plain", "sat", "unsat"])
            .help("the CaDiCaL configuration to use")
            .required(false),
        Arg::with_name(ARG_EXTERNAL_SAT_SOLVER)
            .long("external-sat-solver")
            .empty_values(false)
            .multiple(false)
            .help("a path to an external SAT solver (for the external backend)")
            .required(false),
        Arg::with_name(ARG_EXTERNAL_SAT_SOLVER_OPTIONS)
            .long("external-sat-solver-opt")
            .requires(ARG_EXTERNAL_SAT_SOLVER)
            .empty_values(false)
            .multiple(true)
            .number_of_values(1)
            .allow_hyphen_values(true)
            .help("an option to give to the external SAT solver")
            .required(false),
        Arg::with_name(ARG_IPASIR_LIBRARY)
            .long("ipasir-library")
            .empty_values(false)
            .multiple(false)
            .help("a path to a shared library containing an IPASIR compatible SAT solver (for the ipasir backend)")
            .required(false),
    ]
}

/// Canonicalize a path given by the user.
pub(crate) fn canonicalize_file_path(file_path: &str) -> Result<PathBuf> {
    fs::canonicalize(PathBuf::from(file_path))
        .with_context(|| format!(r#"while opening file "{}""#, file_path))
}

fn path_to_string(path: &Path) -> Result<String> {
    path.to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("cannot handle path {:?}", path))
}

pub(crate) fn create_sat_solver_factory(
    arg_matches: &ArgMatches<'_>,
) -> Result<Arc<dyn IncrementalSatSolver>> {
    let kind = BackendKind::from_str(arg_matches.value_of(ARG_BACKEND).unwrap_or("cadical"))
        .context("while reading the backend kind")?;
    match kind {
        BackendKind::Cadical => {
            let factory = match arg_matches.value_of(ARG_CADICAL_CONFIG) {
                Some(c) => {
                    info!("using the embedded SAT solver with configuration {}", c);
                    CadicalSatSolver::with_config(c)
                }
                None => {
                    info!("using the embedded SAT solver");
                    CadicalSatSolver::default()
                }
            };
            Ok(Arc::new(factory))
        }
        BackendKind::Ipasir => {
            let library = arg_matches
                .value_of(ARG_IPASIR_LIBRARY)
                .ok_or_else(|| anyhow!("the ipasir backend requires an IPASIR library"))?;
            let path = canonicalize_file_path(library)?;
            info!("using {:?} IPASIR library", path);
            let factory = IpasirSatSolver::new(&path_to_string(&path)?)?;
            info!("IPASIR signature is {}", factory.ipasir_signature());
            Ok(Arc::new(factory))
        }
        BackendKind::External => {
            let program = arg_matches
                .value_of(ARG_EXTERNAL_SAT_SOLVER)
                .ok_or_else(|| anyhow!("the external backend requires an external SAT solver"))?;
            let options = arg_matches
                .values_of(ARG_EXTERNAL_SAT_SOLVER_OPTIONS)
                .map(|v| v.map(|o| o.to_string()).collect::<Vec<String>>())
                .unwrap_or_default();
            let path = canonicalize_file_path(program)?;
            info!("using {:?} as external SAT solver", path);
            Ok(Arc::new(ExternalSatSolver::new(
                path_to_string(&path)?,
                options,
            )))
        }
    }
}

const ARG_POOL_SIZE: &str = "POOL_SIZE";
const ARG_WORKERS: &str = "WORKERS";

pub(crate) fn pool_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_POOL_SIZE)
            .long("pool-size")
            .empty_values(false)
            .multiple(false)
            .default_value("2")
            .help("the number of solver states kept ready")
            .required(false),
        Arg::with_name(ARG_WORKERS)
            .long("workers")
            .empty_values(false)
            .multiple(false)
            .default_value("1")
            .help("the number of threads preparing the solver states")
            .required(false),
    ]
}

fn read_usize(arg_matches: &ArgMatches<'_>, arg: &str, name: &str) -> Result<usize> {
    let value = arg_matches
        .value_of(arg)
        .ok_or_else(|| anyhow!("missing {}", name))?;
    usize::from_str(value).with_context(|| format!(r#"while parsing the {} "{}""#, name, value))
}

/// Builds a pool on top of the factory, each state logging its satisfiability checks.
pub(crate) fn create_pool(
    arg_matches: &ArgMatches<'_>,
    factory: Arc<dyn IncrementalSatSolver>,
) -> Result<Pool> {
    let capacity = read_usize(arg_matches, ARG_POOL_SIZE, "pool size")?;
    let workers = read_usize(arg_matches, ARG_WORKERS, "number of workers")?;
    info!(
        "building a pool of {} solver state(s) with {} worker(s)",
        capacity, workers
    );
    PoolBuilder::new(factory, capacity)
        .workers(workers)
        .decorator(|mut state| {
            state.add_listener(Box::<SatSolvingLogger>::default());
            state
        })
        .build()
}
