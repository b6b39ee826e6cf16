pub mod dates;
pub mod habit;
pub mod log;
pub mod progress;
pub mod refresh_path;

use std::{env, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    chart::{
        export::{ChartExporter, FileChartExporter},
        render::ProgressChart,
    },
    config::Config,
    schedule::{CronScheduler, RefreshInterval},
    storage::{
        entities::HabitKind,
        habit_store::{HabitStore, SqliteHabitStore},
        open_database,
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
    wallpaper::{desktop::SystemDesktop, WallpaperPipeline},
};

use dates::DateStyle;
use habit::resolve_habit;
use refresh_path::to_refresh_path;

#[derive(Parser, Debug)]
#[command(name = "Habitwall", version, long_about = None)]
#[command(about = "Track habits, chart them, and keep the result on your wallpaper", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable console logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Create a new habit")]
    Add {
        name: String,
        #[arg(long, value_enum, help = "boolean habits track done/not-done, numeric ones a value")]
        kind: HabitKind,
        #[arg(long, help = "Optional target drawn as a dashed guide line. Zero is a real target")]
        target: Option<f64>,
        #[arg(long, default_value_t = 0., help = "Value an unlogged day counts as")]
        default: f64,
    },
    #[command(about = "List habits with their ids")]
    List {},
    #[command(about = "Delete a habit and all of its logs")]
    Remove { habit: String },
    #[command(about = "Change what an unlogged day counts as for a habit")]
    SetDefault { habit: String, value: f64 },
    #[command(about = "Record a value for a habit. Boolean habits take yes/no")]
    Log {
        habit: String,
        value: String,
        #[arg(
            long,
            help = "Day to log for. Examples are \"yesterday\", \"3 days ago\", \"15/03/2025\". Defaults to today"
        )]
        date: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "Show logged progress as a per-day table")]
    Progress {
        #[arg(help = "Habits to show, by id or name. All habits when empty")]
        habits: Vec<String>,
        #[arg(long = "start", short, help = "Start of the range, free-form like \"2 weeks ago\"")]
        start: Option<String>,
        #[arg(long = "end", short, help = "End of the range, free-form. Defaults to today")]
        end: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "Render the progress chart to a png file")]
    Chart {
        #[arg(long, help = "Output png path")]
        out: PathBuf,
        #[arg(long, default_value_t = 1200)]
        width: u32,
        #[arg(long, default_value_t = 675)]
        height: u32,
        #[arg(help = "Habits to plot, by id or name. All habits when empty")]
        habits: Vec<String>,
    },
    #[command(about = "Regenerate the desktop wallpaper right now")]
    Wallpaper {},
    #[command(about = "Manage the cron entry that refreshes the wallpaper periodically")]
    Schedule {
        #[arg(long, value_enum, help = "Install a refresh at this frequency")]
        every: Option<RefreshInterval>,
        #[arg(long, help = "Remove the scheduled refresh", conflicts_with = "every")]
        off: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let config = Config::load(&app_dir)?;
    let store = SqliteHabitStore::new(open_database(&config.database_path(&app_dir))?);
    let clock = DefaultClock;

    match args.commands {
        Commands::Add {
            name,
            kind,
            target,
            default,
        } => habit::process_add(&store, name, kind, target, default),
        Commands::List {} => habit::process_list(&store),
        Commands::Remove { habit } => habit::process_remove(&store, &habit),
        Commands::SetDefault { habit, value } => {
            habit::process_set_default(&store, &habit, value)
        }
        Commands::Log {
            habit,
            value,
            date,
            date_style,
        } => log::process_log(&store, &clock, &habit, &value, date, date_style),
        Commands::Progress {
            habits,
            start,
            end,
            date_style,
        } => progress::process_progress(&store, &clock, &habits, start, end, date_style),
        Commands::Chart {
            out,
            width,
            height,
            habits,
        } => {
            let ids = selected_ids(&store, &habits)?;
            let chart = ProgressChart::assemble(&store, &ids, clock.today())?;
            FileChartExporter.export_png(chart, &out, width, height).await?;
            println!("Wrote chart to {}", out.display());
            Ok(())
        }
        Commands::Wallpaper {} => {
            let pipeline = WallpaperPipeline::new(
                store,
                SystemDesktop,
                config.wallpaper_dir(&app_dir),
                config.wallpaper.width,
                config.wallpaper.height,
            );
            match pipeline.refresh(&clock).await? {
                Some(path) => println!("Wallpaper updated: {}", path.display()),
                None => println!("No habits yet, wallpaper left untouched."),
            }
            Ok(())
        }
        Commands::Schedule { every, off } => process_schedule(every, off),
    }
}

fn selected_ids(store: &SqliteHabitStore, references: &[String]) -> Result<Vec<i64>> {
    if references.is_empty() {
        Ok(store.habits()?.into_iter().map(|h| h.id).collect())
    } else {
        references
            .iter()
            .map(|r| resolve_habit(store, r).map(|h| h.id))
            .collect()
    }
}

fn process_schedule(every: Option<RefreshInterval>, off: bool) -> Result<()> {
    let refresh_binary = to_refresh_path(env::current_exe()?);
    let scheduler = CronScheduler::new(refresh_binary.display().to_string());

    if off {
        scheduler.remove()?;
        println!("Wallpaper refresh schedule removed.");
        return Ok(());
    }
    if let Some(interval) = every {
        scheduler.set(interval)?;
        println!("Wallpaper will refresh {interval}.");
        return Ok(());
    }
    match scheduler.current()? {
        Some(interval) => println!("Wallpaper refreshes {interval}."),
        None => println!("No wallpaper refresh scheduled."),
    }
    Ok(())
}
