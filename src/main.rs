use app::{AppHelper, CheckBackendCommand, Command, EnumerateCommand};

mod app;

const AUTHORS: &str = "Jean-Marie Lagniez <lagniez@cril.fr>, Emmanuel Lonca <lonca@cril.fr> and Jean-Guy Mailly <jean-guy.mailly@irit.fr>";

fn main() {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let mut app = AppHelper::new(
        app_name,
        app_version,
        AUTHORS,
        "Crustadf, incremental SAT sessions and three-valued interpretations for ADF reasoners.",
    );
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(CheckBackendCommand::new()),
        Box::new(EnumerateCommand::new()),
    ];
    for c in commands {
        app.add_command(c);
    }
    app.launch_app();
}
