use std::{
    env, io,
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use clap::CommandFactory;
use elm_static_html::{
    application::{
        error::AppError,
        pipeline::{Pipeline, PipelineOptions, write_example_config},
        scaffold::FormatOptions,
        workspace::Workspace,
    },
    config,
    infra::{
        elm::{ElmMake, NodeRunner},
        error::InfraError,
        fs::FsStore,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        if error.is_user_error() {
            eprintln!("{}", config::CliArgs::command().render_usage());
        }
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let invocation_dir = env::current_dir().map_err(InfraError::from)?;
    let (cli_args, settings) = config::load_with_cli(&invocation_dir).map_err(|err| {
        AppError::from(InfraError::configuration(format!(
            "failed to load configuration: {err}"
        )))
    })?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    if cli_args.init_config {
        write_example_config(&FsStore, &invocation_dir)?;
        return Ok(());
    }

    let source = cli_args.config_source()?;
    let elm_make = resolve_program(&invocation_dir, &settings.toolchain.elm_make_path);
    let node = resolve_program(&invocation_dir, &settings.toolchain.node_path);
    let options = PipelineOptions {
        workspace: Workspace::resolve(&invocation_dir, &settings.workspace.directory),
        invocation_dir,
        format: FormatOptions::from(&settings.render),
    };

    let mut pipeline = Pipeline::new(
        Arc::new(FsStore),
        Arc::new(ElmMake::new(elm_make)),
        Arc::new(NodeRunner::new(node)),
        options,
    );

    let mut stdout = io::stdout();
    pipeline.run(&source, &mut stdout).await?;
    Ok(())
}

/// Toolchain processes run inside the workspace, so relative paths with a
/// directory part are anchored to the invocation directory. Bare names are
/// left for `PATH` lookup.
fn resolve_program(invocation_dir: &Path, program: &Path) -> PathBuf {
    if program.is_relative() && program.components().count() > 1 {
        invocation_dir.join(program)
    } else {
        program.to_path_buf()
    }
}
