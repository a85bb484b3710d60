use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, LevelFilter};
use qprobe_plans::{catalog, load_dir, resolve, Plan};
use qprobe_rust::config::{init_dotenv, OutputFormat, ProbeConfig};
use qprobe_rust::demo::demo_entries;
use qprobe_rust::{run_plan, AppError};

#[derive(Parser)]
#[command(name = "qprobe", about = "Sondeo adaptativo de SDKs cuánticos y de aceleradores", version)]
struct Cli {
    /// Sube el nivel de log (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', global = true, action = clap::ArgAction::Count)]
    log_level: u8,

    /// Directorio extra de planes (sobrescribe QPROBE_PLAN_DIR)
    #[arg(long, global = true)]
    plan_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lista los planes disponibles con su digest
    List,
    /// Muestra un plan en JSON
    Show { plan: String },
    /// Ejecuta un plan contra los módulos Python instalados
    Run {
        /// Nombre de plan o ruta a un archivo JSON
        plan: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Ejecuta el plan perceval contra la librería fotónica guionada
    Demo {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Formato de salida (sobrescribe QPROBE_FORMAT)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Incluye la traza de los stages exitosos
    #[arg(long)]
    verbose: bool,
    /// Muestra las N salidas de mayor peso
    #[arg(long)]
    top: Option<usize>,
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    let _ = builder.try_init();
}

fn list(config: &ProbeConfig) -> Result<i32, AppError> {
    let mut plans: Vec<Plan> = catalog::all()?;
    if let Some(dir) = &config.plan_dir {
        plans.extend(load_dir(dir)?);
    }
    for plan in plans {
        println!("{:<12} {}  {:<10} {}",
                 plan.name(),
                 &plan.digest[..12],
                 plan.source.to_string(),
                 plan.description());
    }
    Ok(0)
}

fn show(config: &ProbeConfig, name: &str) -> Result<i32, AppError> {
    let plan = resolve(name, config.plan_dir.as_deref())?;
    println!("{}", plan.to_json_pretty()?);
    Ok(0)
}

fn report(session: &qprobe_rust::Session, config: &ProbeConfig, output: &OutputArgs) -> Result<i32, AppError> {
    print!("{}", session.render(config.format, output.verbose, output.top)?);
    Ok(session.exit_status().code())
}

fn demo(config: &ProbeConfig, output: &OutputArgs) -> Result<i32, AppError> {
    let plan = catalog::builtin("perceval")?;
    let mut entries = demo_entries();
    let session = run_plan(&plan, &mut entries, config)?;
    report(&session, config, output)
}

#[cfg(feature = "python")]
fn run(config: &ProbeConfig, name: &str, output: &OutputArgs) -> Result<i32, AppError> {
    let plan = resolve(name, config.plan_dir.as_deref())?;
    qprobe_python::init()?;
    let mut entries = qprobe_python::PythonEntries::with_paths(config.python_path.clone());
    let session = run_plan(&plan, &mut entries, config)?;
    report(&session, config, output)
}

#[cfg(not(feature = "python"))]
fn run(config: &ProbeConfig, name: &str, _output: &OutputArgs) -> Result<i32, AppError> {
    // El plan se valida igual para que un error de sintaxis no quede oculto.
    resolve(name, config.plan_dir.as_deref())?.build()?;
    Err(AppError::PythonUnavailable)
}

fn main() -> ExitCode {
    init_dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let result = ProbeConfig::from_env().and_then(|base| {
                                             let format = match &cli.command {
                                                 Commands::Run { output, .. } | Commands::Demo { output } => output.format,
                                                 _ => None,
                                             };
                                             let config = base.apply_overrides(format, cli.plan_dir.clone());
                                             match &cli.command {
                                                 Commands::List => list(&config),
                                                 Commands::Show { plan } => show(&config, plan),
                                                 Commands::Run { plan, output } => run(&config, plan, output),
                                                 Commands::Demo { output } => demo(&config, output),
                                             }
                                         });

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            error!("{e}");
            eprintln!("qprobe: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
