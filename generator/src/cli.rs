use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tns_schema::{ActionBarFilter, ClassFilter, ViewExtendersFilter};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FilterKind {
    /// Views and everything deriving from them
    ViewExtenders,
    /// The action bar and its items
    ActionBar,
}

impl FilterKind {
    pub fn build(self) -> Box<dyn ClassFilter> {
        match self {
            FilterKind::ViewExtenders => Box::new(ViewExtendersFilter),
            FilterKind::ActionBar => Box::new(ActionBarFilter),
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[arg(short, long, value_name = "DIR", help = "Root directory of the declaration files")]
    pub root: PathBuf,

    #[arg(short, long, value_name = "FILE", help = "Where to write the schema")]
    pub output: PathBuf,

    #[arg(
        short,
        long = "input",
        value_name = "PATTERN",
        default_value = "**/*.d.ts",
        help = "Glob pattern, relative to the root, selecting the files to read"
    )]
    pub inputs: Vec<String>,

    #[arg(
        short = 'f',
        long = "filter-out",
        value_name = "PATTERN",
        help = "Glob pattern of files that are read but whose classes are left out of the schema"
    )]
    pub filter_out: Vec<String>,

    #[arg(
        long = "filter",
        value_enum,
        default_value = "view-extenders",
        help = "Class filters applied in order"
    )]
    pub filters: Vec<FilterKind>,

    #[arg(
        long,
        value_name = "VERSION",
        value_parser = parse_schema_version,
        help = "Version noted in a comment at the top of the schema"
    )]
    pub schema_version: Option<String>,
}

/// The version ends up inside an XML comment, where `--` is not allowed.
fn parse_schema_version(version: &str) -> Result<String, String> {
    if version.contains("--") {
        return Err(format!("{version:?} contains \"--\""));
    }
    Ok(version.to_owned())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["generate-xsd", "-r", "tns", "-o", "tns.xsd"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("tns"));
        assert_eq!(cli.output, PathBuf::from("tns.xsd"));
        assert_eq!(cli.inputs, vec!["**/*.d.ts"]);
        assert!(cli.filter_out.is_empty());
        assert_eq!(cli.filters, vec![FilterKind::ViewExtenders]);
        assert_eq!(cli.schema_version, None);
    }

    #[test]
    fn repeated_options() {
        let cli = Cli::try_parse_from([
            "generate-xsd",
            "--root",
            "tns",
            "--output",
            "out/tns.xsd",
            "-i",
            "ui/**/*.d.ts",
            "-i",
            "color.d.ts",
            "-f",
            "ui/frame.d.ts",
            "--filter",
            "action-bar",
            "--schema-version",
            "1.5.0",
        ])
        .unwrap();
        assert_eq!(cli.inputs, vec!["ui/**/*.d.ts", "color.d.ts"]);
        assert_eq!(cli.filter_out, vec!["ui/frame.d.ts"]);
        assert_eq!(cli.filters, vec![FilterKind::ActionBar]);
        assert_eq!(cli.schema_version.as_deref(), Some("1.5.0"));
    }

    #[test]
    fn root_and_output_are_required() {
        assert!(Cli::try_parse_from(["generate-xsd", "-r", "tns"]).is_err());
        assert!(Cli::try_parse_from(["generate-xsd", "-o", "tns.xsd"]).is_err());
    }

    #[test]
    fn rejects_double_hyphen_versions() {
        let parse = |version: &str| {
            Cli::try_parse_from([
                "generate-xsd",
                "-r",
                "tns",
                "-o",
                "tns.xsd",
                "--schema-version",
                version,
            ])
        };
        assert!(parse("1.0--rc").is_err());
        let cli = parse("1.0-rc").unwrap();
        assert_eq!(cli.schema_version.as_deref(), Some("1.0-rc"));
    }
}
