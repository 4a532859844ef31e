//! The bundled example models and the `example` subcommands.
use super::{RunOpts, handle_run_command};
use crate::settings::Settings;
use anyhow::{Context, Result, bail, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Every example model, one per subfolder
static EXAMPLES_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/demos");

/// The file in each example describing what it demonstrates
const README_FILE_NAME: &str = "README.txt";

/// The available subcommands for managing example models.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available examples.
    List,
    /// Describe the specified example.
    Info {
        /// The name of the example.
        name: String,
    },
    /// Copy an example model's input files to a new directory.
    Extract {
        /// The name of the example to extract.
        name: String,
        /// The destination folder (defaults to a folder named after the example).
        new_path: Option<PathBuf>,
    },
    /// Solve an example model.
    Run {
        /// The name of the example to run.
        name: String,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => example_names().for_each(|name| println!("{name}")),
            Self::Info { name } => println!("{}", Example::get(&name)?.describe()?),
            Self::Extract { name, new_path } => {
                let dest = new_path.unwrap_or_else(|| PathBuf::from(&name));
                Example::get(&name)?.extract(&dest)?;
            }
            Self::Run { name, opts } => handle_example_run_command(&name, &opts, None)?,
        }

        Ok(())
    }
}

/// Names of the bundled examples
pub fn example_names() -> impl Iterator<Item = &'static str> {
    EXAMPLES_DIR
        .dirs()
        .filter_map(|dir| dir.path().file_name()?.to_str())
}

/// An example model embedded in the program
struct Example {
    name: &'static str,
    dir: &'static Dir<'static>,
}

impl Example {
    /// Look up an example by name
    fn get(name: &str) -> Result<Self> {
        let dir = EXAMPLES_DIR
            .get_dir(name)
            .with_context(|| format!("Example not found: {name}"))?;
        let name = dir
            .path()
            .to_str()
            .context("Invalid chars in example name")?;

        Ok(Self { name, dir })
    }

    /// The input files making up the model, other than the README
    fn input_files(&self) -> impl Iterator<Item = &'static str> {
        self.dir
            .files()
            .filter_map(|file| file.path().file_name()?.to_str())
            .filter(|file_name| *file_name != README_FILE_NAME)
    }

    /// The README followed by a list of the model's input files
    fn describe(&self) -> Result<String> {
        let readme = self
            .dir
            .get_file(Path::new(self.name).join(README_FILE_NAME))
            .with_context(|| format!("Example {} has no {README_FILE_NAME}", self.name))?
            .contents_utf8()
            .with_context(|| format!("{README_FILE_NAME} is not UTF-8 encoded"))?;

        let mut description = readme.trim_end().to_string();
        description.push_str("\n\nInput files:");
        for file_name in self.input_files() {
            description.push_str("\n  ");
            description.push_str(file_name);
        }

        Ok(description)
    }

    /// Write the example's files to a new directory at `dest`
    fn extract(&self, dest: &Path) -> Result<()> {
        ensure!(
            !dest.exists(),
            "Destination directory {} already exists",
            dest.display()
        );

        fs::create_dir(dest)
            .with_context(|| format!("Could not create directory {}", dest.display()))?;
        for entry in self.dir.entries() {
            let DirEntry::File(file) = entry else {
                bail!("Subdirectories in examples not supported");
            };
            let file_name = file.path().file_name().context("Invalid file in example")?;
            fs::write(dest.join(file_name), file.contents())?;
        }

        Ok(())
    }
}

/// Handle the `example run` command.
///
/// The example is extracted to a temporary folder and run from there, so by default results go
/// to a folder named after the example in the current directory.
pub fn handle_example_run_command(
    name: &str,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let example = Example::get(name)?;
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let model_path = temp_dir.path().join(example.name);
    example.extract(&model_path)?;

    handle_run_command(&model_path, opts, settings)
}
