use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use xm_core::Handle;
use xm_fluids::{Endpoint, FluidKey, Prop, PropertyRecord, StateValues};
use xm_media::{
    ConstantKind, MediaConfig, MediaContext, MediaError, MediaResult, StateSummary, boundary,
};

#[derive(Parser)]
#[command(name = "xm-cli")]
#[command(about = "External media CLI - query fluid states through the medium-state layer", long_about = None)]
struct Cli {
    /// YAML configuration file (pool size, mismatch tolerance)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FluidArgs {
    /// Library name (TestMedium, IdealGas..., Incompressible...)
    #[arg(long)]
    library: String,
    /// Substance; mixtures separate components with '-'
    #[arg(long)]
    substance: String,
    /// One concentration per component, comma separated
    #[arg(long, value_delimiter = ',')]
    composition: Vec<f64>,
}

impl FluidArgs {
    fn key(&self) -> MediaResult<FluidKey> {
        if self.composition.is_empty() {
            Ok(FluidKey::new(&self.library, &self.substance))
        } else {
            Ok(FluidKey::mixture(&self.library, &self.substance, &self.composition)?)
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Pair {
    #[value(name = "dT")]
    DT,
    #[value(name = "ph")]
    PH,
    #[value(name = "ps")]
    PS,
    #[value(name = "pT")]
    PT,
}

impl Pair {
    fn code(self) -> i32 {
        match self {
            Pair::DT => 0,
            Pair::PH => 1,
            Pair::PS => 2,
            Pair::PT => 3,
        }
    }

    fn values(self, a: f64, b: f64) -> StateValues {
        let mut values = StateValues::default();
        match self {
            Pair::DT => (values.d, values.t) = (a, b),
            Pair::PH => (values.p, values.h) = (a, b),
            Pair::PS => (values.p, values.s) = (a, b),
            Pair::PT => (values.p, values.t) = (a, b),
        }
        values
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a state from an input pair
    State {
        #[command(flatten)]
        fluid: FluidArgs,
        /// Input pair
        #[arg(long, value_enum)]
        pair: Pair,
        /// First input value (SI)
        a: f64,
        /// Second input value (SI)
        b: f64,
        /// Phase hint: 0 unknown, 1 one-phase, 2 two-phase
        #[arg(long, default_value_t = 0)]
        phase: i32,
    },
    /// Saturation line at a pressure or a temperature
    Sat {
        #[command(flatten)]
        fluid: FluidArgs,
        /// Saturation pressure [Pa]
        #[arg(long, conflicts_with = "temperature", required_unless_present = "temperature")]
        pressure: Option<f64>,
        /// Saturation temperature [K]
        #[arg(long)]
        temperature: Option<f64>,
    },
    /// Fluid constants
    Constants {
        #[command(flatten)]
        fluid: FluidArgs,
    },
    /// Dew state of the (p, h) state
    Dew(EndpointArgs),
    /// Bubble state of the (p, h) state
    Bubble(EndpointArgs),
}

#[derive(Args)]
struct EndpointArgs {
    #[command(flatten)]
    fluid: FluidArgs,
    /// Pressure of the root state [Pa]
    #[arg(long)]
    pressure: f64,
    /// Specific enthalpy of the root state [J/kg]
    #[arg(long)]
    enthalpy: f64,
    /// 1 one-phase side, 2 two-phase side
    #[arg(long, default_value_t = 1)]
    side: i32,
}

fn main() -> MediaResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let config = MediaConfig::load_yaml(path)?;
            tracing::info!(path = %path.display(), max_solver = config.max_solver, "loaded config");
            config
        }
        None => MediaConfig::default(),
    };
    let mut ctx = MediaContext::new(config)?;

    match cli.command {
        Commands::State {
            fluid,
            pair,
            a,
            b,
            phase,
        } => cmd_state(&mut ctx, &fluid, pair, a, b, phase),
        Commands::Sat {
            fluid,
            pressure,
            temperature,
        } => cmd_sat(&mut ctx, &fluid, pressure, temperature),
        Commands::Constants { fluid } => cmd_constants(&mut ctx, &fluid),
        Commands::Dew(args) => cmd_endpoint(&mut ctx, Endpoint::Dew, &args),
        Commands::Bubble(args) => cmd_endpoint(&mut ctx, Endpoint::Bubble, &args),
    }
}

fn cmd_state(
    ctx: &mut MediaContext,
    fluid: &FluidArgs,
    pair: Pair,
    a: f64,
    b: f64,
    phase: i32,
) -> MediaResult<()> {
    let key = fluid.key()?;
    let summary = boundary::set_state(ctx, &key, pair.code(), pair.values(a, b), phase, 0)?;
    print_summary(&key, &summary);
    Ok(())
}

fn cmd_sat(
    ctx: &mut MediaContext,
    fluid: &FluidArgs,
    pressure: Option<f64>,
    temperature: Option<f64>,
) -> MediaResult<()> {
    let key = fluid.key()?;
    let sat = match (pressure, temperature) {
        (Some(p), _) => boundary::set_sat_p(ctx, &key, p, 0)?,
        (None, Some(t)) => boundary::set_sat_t(ctx, &key, t, 0)?,
        (None, None) => {
            return Err(MediaError::InvalidInput(
                "either --pressure or --temperature is required".into(),
            ));
        }
    };
    let record = ctx.registry().resolve(sat.handle)?.record();
    println!("Saturation of {key}:");
    for prop in [
        Prop::Ps,
        Prop::Ts,
        Prop::Dl,
        Prop::Dv,
        Prop::Hl,
        Prop::Hv,
        Prop::Sl,
        Prop::Sv,
        Prop::Sigma,
        Prop::DTsDp,
    ] {
        print_field(record, prop);
    }
    Ok(())
}

fn cmd_constants(ctx: &mut MediaContext, fluid: &FluidArgs) -> MediaResult<()> {
    let key = fluid.key()?;
    println!("Constants of {key}:");
    for (label, kind) in [
        ("molar mass [kg/mol]", ConstantKind::MolarMass),
        ("critical temperature [K]", ConstantKind::CriticalTemperature),
        ("critical pressure [Pa]", ConstantKind::CriticalPressure),
        ("critical density [kg/m3]", ConstantKind::CriticalDensity),
        ("critical molar volume [m3/mol]", ConstantKind::CriticalMolarVolume),
    ] {
        println!("  {label:32} {:.6e}", boundary::fluid_constant(ctx, &key, kind)?);
    }
    Ok(())
}

fn cmd_endpoint(
    ctx: &mut MediaContext,
    endpoint: Endpoint,
    args: &EndpointArgs,
) -> MediaResult<()> {
    let key = args.fluid.key()?;
    let root_values = Pair::PH.values(args.pressure, args.enthalpy);
    let root = boundary::set_state(ctx, &key, Pair::PH.code(), root_values, 0, 0)?;
    print_summary(&key, &root);

    let raw = match endpoint {
        Endpoint::Dew => boundary::set_dew_state(ctx, root.handle.get(), args.side)?,
        Endpoint::Bubble => boundary::set_bubble_state(ctx, root.handle.get(), args.side)?,
    };
    let handle = Handle::require(raw, endpoint.label())?;
    let record = ctx.registry().resolve(handle)?.record();
    println!("{} state (side {}):", endpoint.label(), args.side);
    println!("  phase = {:?}", record.phase());
    for prop in [Prop::P, Prop::T, Prop::D, Prop::H, Prop::S] {
        print_field(record, prop);
    }
    Ok(())
}

fn print_summary(key: &FluidKey, summary: &StateSummary) {
    println!("State of {key} (handle {}):", summary.handle);
    println!("  phase = {:?}", summary.phase);
    println!("  p     = {:.6e} Pa", summary.p);
    println!("  T     = {:.6e} K", summary.t);
    println!("  d     = {:.6e} kg/m3", summary.d);
    println!("  h     = {:.6e} J/kg", summary.h);
    println!("  s     = {:.6e} J/(kg K)", summary.s);
    if let Some((x, y)) = &summary.fractions {
        println!("  x     = {x:?}");
        println!("  y     = {y:?}");
    }
}

fn print_field(record: &PropertyRecord, prop: Prop) {
    match record.cached(prop) {
        Some(v) => println!("  {:8} = {v:.6e}", prop.name()),
        None => println!("  {:8} = (not computed)", prop.name()),
    }
}
