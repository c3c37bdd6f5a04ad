use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("non-.ts file detected: {0}; only TypeScript declaration files can be read")]
    NotTypeScript(String),
    #[error("invalid glob pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("failed to expand glob pattern")]
    Glob(#[from] glob::GlobError),
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The files selected on the command line, as `/`-separated paths relative to the root.
#[derive(Debug)]
pub struct Input {
    pub root: PathBuf,
    /// Every file read into the program.
    pub all_files: Vec<String>,
    /// The files whose classes go into the schema.
    pub api_files: Vec<String>,
    pub out_file_path: PathBuf,
}

impl Input {
    pub fn from_cli(cli: &Cli) -> Result<Self, InputError> {
        let all_files = expand_patterns(&cli.root, &cli.inputs, &[])?;
        let all_files = drop_private_files(&cli.root, all_files)?;
        let api_files = expand_patterns(&cli.root, &cli.inputs, &cli.filter_out)?;
        let api_files = drop_private_files(&cli.root, api_files)?;
        debug!(
            all = all_files.len(),
            api = api_files.len(),
            "resolved input files"
        );
        Ok(Self {
            root: cli.root.clone(),
            all_files,
            api_files,
            out_file_path: cli.output.clone(),
        })
    }

    pub fn path_of(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }
}

/// Files matching any of `includes` and none of `excludes`, in match order without repeats.
fn expand_patterns(
    root: &Path,
    includes: &[String],
    excludes: &[String],
) -> Result<Vec<String>, InputError> {
    let excluded = matching_files(root, excludes)?;
    let mut files = Vec::new();
    for file in matching_files(root, includes)? {
        if !excluded.contains(&file) && !files.contains(&file) {
            files.push(file);
        }
    }
    Ok(files)
}

fn matching_files(root: &Path, patterns: &[String]) -> Result<Vec<String>, InputError> {
    let prefix = glob::Pattern::escape(&root.to_string_lossy());
    let mut files = Vec::new();
    for pattern in patterns {
        let full_pattern = format!("{prefix}/{pattern}");
        let paths = glob::glob(&full_pattern).map_err(|source| InputError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for path in paths {
            let path = path?;
            if path.is_dir() {
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(&path);
            files.push(unixify(relative));
        }
    }
    Ok(files)
}

fn unixify(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Rejects anything that is not a `.ts` file and leaves out files marked `@private` on their
/// first line.
fn drop_private_files(root: &Path, files: Vec<String>) -> Result<Vec<String>, InputError> {
    let mut public = Vec::with_capacity(files.len());
    for file in files {
        if file.len() <= ".ts".len() || !file.ends_with(".ts") {
            return Err(InputError::NotTypeScript(file));
        }
        if first_line(&root.join(&file))?.contains("@private") {
            info!("Skipping private file {file}");
            continue;
        }
        public.push(file);
    }
    Ok(public)
}

fn first_line(path: &Path) -> Result<String, InputError> {
    let io_error = |source| InputError::Io {
        path: path.to_owned(),
        source,
    };
    let file = fs::File::open(path).map_err(io_error)?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line).map_err(io_error)?;
    Ok(line)
}
