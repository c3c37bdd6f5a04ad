mod cli;
mod input;

use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::{fs, io};

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tns_schema::{
    ClassExtractor, ClassFilter, SchemaWriter, ValidatorRegistry, SCHEMA_ROOT_ATTRIBUTES,
    SCHEMA_ROOT_NAME,
};
use tns_typings::{ParseError, Program, SourceText};

use cli::Cli;
use input::{Input, InputError};

#[derive(Debug, Error)]
enum GeneratorError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] tns_schema::Error),
    #[error("generated schema is not well-formed XML")]
    Malformed(#[from] roxmltree::Error),
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn read_sources(input: &Input) -> Result<Vec<SourceText>, GeneratorError> {
    input
        .all_files
        .iter()
        .map(|file| {
            let path = input.path_of(file);
            fs::read_to_string(&path)
                .map(|text| SourceText::new(file.as_str(), text))
                .map_err(|source| GeneratorError::Read { path, source })
        })
        .collect()
}

fn generate(
    input: &Input,
    filters: &[Box<dyn ClassFilter>],
    version: Option<String>,
) -> Result<String, GeneratorError> {
    let program = Program::new(read_sources(input)?)?;
    let tree = ClassExtractor::new(&program)
        .with_output_files(input.api_files.iter().cloned())
        .build_tree(filters)?;
    info!("Extracted {} classes", tree.classes().len());

    let mut registry = ValidatorRegistry::new();
    let xsd = SchemaWriter::new(version).write(
        SCHEMA_ROOT_NAME,
        &tree,
        &SCHEMA_ROOT_ATTRIBUTES,
        &mut registry,
    )?;
    roxmltree::Document::parse(&xsd)?;
    Ok(xsd)
}

fn run(cli: Cli) -> Result<(), GeneratorError> {
    let input = Input::from_cli(&cli)?;
    info!(
        "Reading {} files from {}",
        input.all_files.len(),
        input.root.display()
    );
    let filters: Vec<Box<dyn ClassFilter>> = cli.filters.iter().map(|f| f.build()).collect();
    let xsd = generate(&input, &filters, cli.schema_version)?;

    fs::write(&input.out_file_path, xsd).map_err(|source| GeneratorError::Write {
        path: input.out_file_path.clone(),
        source,
    })?;
    info!("Schema written to {}", input.out_file_path.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut message = err.to_string();
            let mut source = err.source();
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;

    const RESOURCES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/resources");

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["generate-xsd", "-r", RESOURCES, "-o", "tns.xsd"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    fn generate_for(cli: &Cli) -> Result<String, GeneratorError> {
        let input = Input::from_cli(cli)?;
        let filters: Vec<Box<dyn ClassFilter>> = cli.filters.iter().map(|f| f.build()).collect();
        generate(&input, &filters, cli.schema_version.clone())
    }

    fn complex_types(xml: &str) -> Vec<String> {
        let document = Document::parse(xml).unwrap();
        document
            .root_element()
            .children()
            .filter(|n| n.tag_name().name() == "complexType")
            .filter_map(|n| n.attribute("name"))
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn generates_schema_for_public_files() {
        let xml = generate_for(&cli(&["--schema-version", "2.0.0"])).unwrap();
        assert!(xml.contains("<!-- UI markup schema for version 2.0.0 -->"));
        let mut types = complex_types(&xml);
        types.sort();
        assert_eq!(types, vec!["Label", "LegacyPanel", "View"]);
    }

    #[test]
    fn filtered_out_classes_are_left_out() {
        let xml = generate_for(&cli(&["-f", "ui/legacy.d.ts"])).unwrap();
        let mut types = complex_types(&xml);
        types.sort();
        assert_eq!(types, vec!["Label", "View"]);
        assert!(xml.contains("labelAttributes"));
    }

    #[test]
    fn action_bar_filter_leaves_plain_views_out() {
        let xml = generate_for(&cli(&["--filter", "action-bar"])).unwrap();
        assert!(complex_types(&xml).is_empty());
    }

    #[test]
    fn run_writes_the_output_file() {
        let output = std::env::temp_dir().join(format!("tns-{}.xsd", std::process::id()));
        let cli = Cli::parse_from([
            "generate-xsd",
            "-r",
            RESOURCES,
            "-o",
            output.to_str().unwrap(),
        ]);
        run(cli).unwrap();
        let xml = fs::read_to_string(&output).unwrap();
        fs::remove_file(&output).unwrap();
        assert!(complex_types(&xml).contains(&"Label".to_owned()));
    }

    #[test]
    fn missing_root_is_an_empty_program() {
        let cli = Cli::parse_from([
            "generate-xsd",
            "-r",
            concat!(env!("CARGO_MANIFEST_DIR"), "/tests/resources/missing"),
            "-o",
            "tns.xsd",
        ]);
        let xml = generate_for(&cli).unwrap();
        assert!(complex_types(&xml).is_empty());
    }
}
