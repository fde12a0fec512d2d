use clap::{Parser, Subcommand};
use scribe::config::{self, BlogConfig, Overrides};
use scribe::generate::{self, BuildOptions};
use scribe::output;
use std::path::{Path, PathBuf};

/// Template and link flags shared by `build` and `check`.
#[derive(clap::Args, Clone)]
struct SiteArgs {
    /// Directory containing the blog sources
    input: PathBuf,

    /// Directory to write the blog into
    output: PathBuf,

    /// Post template (overrides templates.post)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Index page template (overrides templates.index)
    #[arg(long)]
    index_template: Option<PathBuf>,

    /// Prefix for every internal link, e.g. "/blog" (overrides links.prefix)
    #[arg(long)]
    link_prefix: Option<String>,
}

impl SiteArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            template: self.template.clone(),
            index_template: self.index_template.clone(),
            link_prefix: self.link_prefix.clone(),
        }
    }

    fn options(&self, dry_run: bool) -> BuildOptions {
        BuildOptions {
            input_dir: self.input.clone(),
            output_dir: self.output.clone(),
            dry_run,
        }
    }
}

#[derive(clap::Args, Clone)]
struct BuildArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Show what would be done without creating or writing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Static blog generator for directories of markdown posts")]
#[command(long_about = "\
Static blog generator for directories of markdown posts

Your filesystem is the data source. Every directory holding exactly one
markdown file is a post; other files next to it are copied along. Posts are
ordered by directory name, so date-prefixed directories read chronologically.

Input structure:

  blog/
  ├── 2021-03-05-hello/
  │   ├── hello.md                 # Post → 2021-03-05-hello/hello.html
  │   └── diagram.png              # Asset, copied next to the post
  ├── 2021-04-11-rust/
  │   └── rust.md
  ├── assets/                      # No markdown: copied verbatim
  │   └── style.css
  └── .drafts/                     # Hidden: ignored

Templates are HTML files with placeholders:
  {{content}}     rendered post body (required)
  {{title}}       text of the first element in the rendered body
  {{newer_link}}  next post in directory order, or the index page
  {{older_link}}  previous post in directory order, or the index page

Settings are read from scribe.toml in the working directory when present.
Run 'scribe gen-config' to generate a documented scribe.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: scribe.toml in the working directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render posts, copy assets, and write the index page
    Build(BuildArgs),
    /// Validate templates and input layout without writing anything
    Check(SiteArgs),
    /// Print a stock scribe.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build(args) => {
            let config = resolve_config(cli.config.as_deref(), &args.site.overrides())?;
            let options = args.site.options(args.dry_run);

            println!(
                "==> Building {} → {}",
                options.input_dir.display(),
                options.output_dir.display()
            );
            let report = generate::generate(&options, &config)?;
            output::print_build_output(&report);

            if let Some(report_path) = &args.report {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(report_path, json)?;
            }
            println!("==> Build complete: {}", options.output_dir.display());
        }
        Command::Check(args) => {
            let config = resolve_config(cli.config.as_deref(), &args.overrides())?;
            let options = args.options(true);

            println!("==> Checking {}", options.input_dir.display());
            let site = generate::check(&options, &config)?;
            output::print_check_output(&site);
            println!("==> Input is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file, apply command-line overrides, and validate.
///
/// An explicit `--config` must exist; the default `scribe.toml` is optional.
fn resolve_config(
    config_path: Option<&Path>,
    overrides: &Overrides,
) -> Result<BlogConfig, config::ConfigError> {
    let mut config = match config_path {
        Some(path) => config::load_required_config(path)?,
        None => config::load_config(Path::new(config::CONFIG_FILE_NAME))?,
    };
    config.apply(overrides);
    config.validate()?;
    Ok(config)
}
