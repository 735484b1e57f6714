use super::{IncrementalSatSolver, SatBackend, SolveLimit, SolverState, SolvingResult};
use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use std::{
    io::{BufRead, BufReader, Cursor, Read},
    process::{Command, Stdio},
};

type SolvingFn = dyn Fn(DimacsInstanceRead) -> Result<Box<dyn Read>> + Send;

/// The DIMACS instance given to a solving function: the preamble, the clauses, then the assumptions as unit clauses.
pub(crate) struct DimacsInstanceRead {
    preamble: Cursor<String>,
    clauses: Cursor<String>,
    assumptions: Cursor<String>,
}

impl Read for DimacsInstanceRead {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let r = self.preamble.read(buf)?;
        if r > 0 {
            return Ok(r);
        }
        let r = self.clauses.read(buf)?;
        if r > 0 {
            return Ok(r);
        }
        self.assumptions.read(buf)
    }
}

const DEFAULT_BUFFER_CAP: usize = 1 << 20;

/// A [`SatBackend`] buffering the clauses and handing a full DIMACS instance to a solving function at each check.
///
/// The output of the solving function must follow the format of the SAT competitions.
/// Such backends cannot enforce [`SolveLimit`]s; they are ignored.
pub struct ExternalBackend {
    n_vars: usize,
    n_clauses: usize,
    clauses: String,
    assumptions: Vec<i32>,
    model: Vec<Option<bool>>,
    solving_fn: Box<SolvingFn>,
    signature: String,
}

impl ExternalBackend {
    pub(crate) fn new(solving_fn: Box<SolvingFn>, signature: String) -> Self {
        Self {
            n_vars: 0,
            n_clauses: 0,
            clauses: String::with_capacity(DEFAULT_BUFFER_CAP),
            assumptions: vec![],
            model: vec![],
            solving_fn,
            signature,
        }
    }

    fn update_n_vars(&mut self, l: i32) {
        self.n_vars = usize::max(self.n_vars, l.unsigned_abs() as usize);
    }

    fn read_output(&mut self, output: Box<dyn Read>) -> Result<SolvingResult> {
        let context = "error while reading solver output";
        let mut status = None;
        let mut model = vec![None; self.n_vars];
        let mut model_line_seen = false;
        let mut model_line_end = false;
        for line in BufReader::new(output).lines() {
            let line = line.context(context)?;
            if line == "s SATISFIABLE" || line == "s UNSATISFIABLE" || line == "s UNKNOWN" {
                if status.is_some() {
                    bail!("{}: multiple status lines", context)
                }
                status = Some(match line.as_str() {
                    "s SATISFIABLE" => SolvingResult::Satisfiable,
                    "s UNSATISFIABLE" => SolvingResult::Unsatisfiable,
                    _ => SolvingResult::Unknown,
                });
            } else if line.starts_with("v ") {
                model_line_seen = true;
                for w in line.split_ascii_whitespace().skip(1) {
                    let n = w
                        .parse::<i32>()
                        .map_err(|_| anyhow!(r#"{}: "{}" is not a literal"#, context, w))?;
                    if n == 0 {
                        if model_line_end {
                            bail!("{}: multiple zeroes on value line", context)
                        }
                        model_line_end = true;
                    } else {
                        let v = n.unsigned_abs() as usize - 1;
                        if v >= self.n_vars {
                            bail!("{}: a variable in value line is out of bounds", context)
                        }
                        model[v] = Some(n > 0);
                    }
                }
            } else if !line.starts_with("c ") && line != "c" && line != "v" && !line.is_empty() {
                bail!(r#"{}: unexpected line "{}""#, context, line)
            }
        }
        Ok(match status {
            Some(SolvingResult::Satisfiable) if model_line_seen => {
                self.model = model;
                SolvingResult::Satisfiable
            }
            Some(SolvingResult::Unsatisfiable) => SolvingResult::Unsatisfiable,
            _ => SolvingResult::Unknown,
        })
    }
}

impl SatBackend for ExternalBackend {
    fn add_clause(&mut self, clause: &[i32]) {
        for l in clause {
            self.update_n_vars(*l);
            self.clauses.push_str(&format!("{} ", l));
        }
        self.clauses.push_str("0\n");
        self.n_clauses += 1;
    }

    fn assume(&mut self, l: i32) {
        self.update_n_vars(l);
        self.assumptions.push(l);
    }

    fn solve(&mut self, limit: Option<SolveLimit>) -> Result<SolvingResult> {
        if let Some(l) = limit {
            debug!("ignoring limit {:?} for external solver {}", l, self.signature);
        }
        self.model.clear();
        let assumptions = std::mem::take(&mut self.assumptions);
        let preamble = format!(
            "p cnf {} {}\n",
            self.n_vars,
            self.n_clauses + assumptions.len()
        );
        let assumptions = assumptions.iter().fold(String::new(), |mut acc, a| {
            acc.push_str(&format!("{} 0\n", a));
            acc
        });
        let instance_reader = DimacsInstanceRead {
            preamble: Cursor::new(preamble),
            clauses: Cursor::new(self.clauses.clone()),
            assumptions: Cursor::new(assumptions),
        };
        let output = (self.solving_fn)(instance_reader)?;
        self.read_output(output)
    }

    fn value(&self, var: i32) -> Option<bool> {
        if var < 1 {
            return None;
        }
        self.model.get(var as usize - 1).copied().flatten()
    }

    fn signature(&self) -> String {
        self.signature.clone()
    }
}

/// A factory of solver states which checks are made by a system command.
///
/// The system command is composed by an executable program, and a potential list of CLI arguments.
///
/// The SAT solver must read from the standard input (if it does not by default, this may be possible with the right CLI arguments).
/// The input and output formats must follow the ones from the SAT competitions.
/// Since the whole instance is given to the program at each check, the states are not really incremental.
pub struct ExternalSatSolver {
    program: String,
    options: Vec<String>,
}

impl ExternalSatSolver {
    /// Builds a new external SAT solver factory.
    ///
    /// The `program` argument is the path from a directory in execution path to the software to execute.
    /// The `options` parameter is the CLI options to provide to the software under execution.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use crustadf::sat::{Atom, ExternalSatSolver, IncrementalSatSolver};
    /// let factory = ExternalSatSolver::new(
    ///     "/home/me/my_solver".to_string(),
    ///     vec!["-i".to_string(), "/dev/stdin".to_string()],
    /// );
    /// let mut state = factory.create_state().unwrap();
    /// let a = Atom::persistent("a");
    /// state.add(&[a.positive()]);
    /// assert!(state.satisfiable().unwrap());
    /// ```
    pub fn new(program: String, options: Vec<String>) -> Self {
        Self { program, options }
    }
}

impl IncrementalSatSolver for ExternalSatSolver {
    fn create_state(&self) -> Result<SolverState> {
        let program = self.program.clone();
        let options = self.options.clone();
        let signature = std::iter::once(program.as_str())
            .chain(options.iter().map(|o| o.as_str()))
            .collect::<Vec<&str>>()
            .join(" ");
        let backend = ExternalBackend::new(
            Box::new(move |r| exec_solver(r, &program, &options)),
            signature,
        );
        Ok(SolverState::new(Box::new(backend)))
    }
}

fn exec_solver(
    mut reader: DimacsInstanceRead,
    program: &str,
    options: &[String],
) -> Result<Box<dyn Read>> {
    let mut child = Command::new(program)
        .args(options)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!(r#"failed to spawn external solver "{}""#, program))?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("failed to open the stdin of the external solver"))?;
    let writer = std::thread::spawn(move || std::io::copy(&mut reader, &mut stdin));
    let output = child
        .wait_with_output()
        .context("failed to wait on the external solver")?;
    // the solver may exit without reading its input
    if let Ok(Err(e)) = writer.join() {
        debug!("external solver input was not fully written: {}", e);
    }
    Ok(Box::new(Cursor::new(output.stdout)))
}
