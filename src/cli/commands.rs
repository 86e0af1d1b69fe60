//! Command dispatch: one function per subcommand

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::CodecParams;
use crate::cli::args::{Cli, Commands, ConfigCommands, FieldArgs, FormatArgs, LinkArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, RootValue, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Input path meaning "read from stdin".
const STDIN: &str = "-";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;

    match &cli.command {
        Some(Commands::Build {
            input,
            output,
            fields,
            link,
            format,
        }) => {
            let container = load_container(&project_dir)?;
            let params = codec_params(&container, fields, Some(link), Some(format))?;
            _build(&container, params, input, output.as_deref())
        }
        Some(Commands::Flatten {
            input,
            output,
            fields,
            format,
        }) => {
            let container = load_container(&project_dir)?;
            let params = codec_params(&container, fields, None, Some(format))?;
            _flatten(&container, params, input, output.as_deref())
        }
        Some(Commands::Show {
            input,
            label,
            fields,
            link,
        }) => {
            let container = load_container(&project_dir)?;
            let mut params = codec_params(&container, fields, Some(link), None)?;
            if let Some(label) = label {
                params.label_field = label.clone();
            }
            _show(&container, params, input)
        }
        Some(Commands::Stats {
            input,
            fields,
            link,
        }) => {
            let container = load_container(&project_dir)?;
            let params = codec_params(&container, fields, Some(link), None)?;
            _stats(&container, params, input)
        }
        Some(Commands::Config { command }) => _config(command, &project_dir),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "rowtree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run 'rowtree --help'".into(),
        )),
    }
}

fn resolve_project_dir(project_dir: Option<&Path>) -> CliResult<PathBuf> {
    match project_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("resolve current directory", e))),
    }
}

fn load_container(project_dir: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(project_dir))?;
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

/// Layer command line overrides over the configured parameters.
fn codec_params(
    container: &ServiceContainer,
    fields: &FieldArgs,
    link: Option<&LinkArgs>,
    format: Option<&FormatArgs>,
) -> CliResult<CodecParams> {
    let mut params = container.default_params();

    if let Some(id_field) = &fields.id_field {
        params.schema.id_field = id_field.clone();
    }
    if let Some(parent_field) = &fields.parent_field {
        params.schema.parent_field = parent_field.clone();
    }
    if let Some(children_field) = &fields.children_field {
        params.schema.children_field = children_field.clone();
    }

    if let Some(link) = link {
        if link.no_root {
            params.root = None;
        } else if let Some(root) = &link.root {
            params.root = RootValue::parse(root).to_key();
        }
        if let Some(policy) = link.on_dangling {
            params.on_dangling = policy;
        }
    }

    if format.is_some_and(|f| f.compact) {
        params.pretty = false;
    }

    validate_schema(&params)?;
    Ok(params)
}

fn validate_schema(params: &CodecParams) -> CliResult<()> {
    let schema = &params.schema;
    let names = [
        &schema.id_field,
        &schema.parent_field,
        &schema.children_field,
    ];
    if names.iter().any(|name| name.is_empty()) {
        return Err(CliError::InvalidArgs("field names must not be empty".into()));
    }
    if schema.id_field == schema.parent_field
        || schema.id_field == schema.children_field
        || schema.parent_field == schema.children_field
    {
        return Err(CliError::InvalidArgs(format!(
            "id, parent and children fields must differ (got '{}', '{}', '{}')",
            schema.id_field, schema.parent_field, schema.children_field
        )));
    }
    Ok(())
}

/// Read the whole of stdin when `input` is "-".
fn read_stdin(input: &Path) -> CliResult<Option<String>> {
    if input.as_os_str() != STDIN {
        return Ok(None);
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| InfraError::io("read stdin", e))?;
    Ok(Some(text))
}

fn emit_document(document: &str, output: Option<&Path>) {
    match output {
        Some(path) => output::success(&format!("wrote {}", path.display())),
        None => output::info(document),
    }
}

#[instrument(skip(container, params))]
fn _build(
    container: &ServiceContainer,
    params: CodecParams,
    input: &Path,
    output: Option<&Path>,
) -> CliResult<()> {
    let service = container.codec_service(params);
    let document = match read_stdin(input)? {
        Some(text) => {
            let document = service.build_document(&text)?;
            service.write_document(output, &document)?;
            document
        }
        None => service.build_file(input, output)?,
    };
    emit_document(&document, output);
    Ok(())
}

#[instrument(skip(container, params))]
fn _flatten(
    container: &ServiceContainer,
    params: CodecParams,
    input: &Path,
    output: Option<&Path>,
) -> CliResult<()> {
    let service = container.codec_service(params);
    let document = match read_stdin(input)? {
        Some(text) => {
            let document = service.flatten_document(&text)?;
            service.write_document(output, &document)?;
            document
        }
        None => service.flatten_file(input, output)?,
    };
    emit_document(&document, output);
    Ok(())
}

#[instrument(skip(container, params))]
fn _show(container: &ServiceContainer, params: CodecParams, input: &Path) -> CliResult<()> {
    let service = container.codec_service(params);
    let drawing = match read_stdin(input)? {
        Some(text) => service.render_document(&text)?,
        None => service.render_file(input)?,
    };
    output::info(&drawing);
    Ok(())
}

#[instrument(skip(container, params))]
fn _stats(container: &ServiceContainer, params: CodecParams, input: &Path) -> CliResult<()> {
    let service = container.codec_service(params);
    let stats = match read_stdin(input)? {
        Some(text) => service.stats_document(&text)?,
        None => service.stats_file(input)?,
    };
    output::header(&input.display());
    output::field("roots", &stats.roots);
    output::field("nodes", &stats.nodes);
    output::field("depth", &stats.depth);
    output::field("leaves", &stats.leaves);
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
        }
        ConfigCommands::Path => {
            output::header("config files");
            match global_config_path() {
                Some(path) => output::field("global", &describe_path(&path)),
                None => output::field("global", &"(no config directory)"),
            }
            output::field("local", &describe_path(&local_config_path(project_dir)));
        }
    }
    Ok(())
}

fn describe_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
