use std::path::PathBuf;

use elm_static_html::{
    application::scaffold::{DriverProgram, FormatOptions},
    domain::{
        module_name::ModuleName,
        render_config::{
            EntryFunction, ModuleRenderSpec, OutputDestination, RenderConfiguration, RenderTarget,
        },
    },
};

fn configuration(entries: &[(&str, &str, &[(&str, &str)])]) -> RenderConfiguration {
    let mut config = RenderConfiguration::new();
    for (file, module, targets) in entries {
        let targets = targets
            .iter()
            .map(|(output, entry)| {
                RenderTarget::new(
                    OutputDestination::from_key(output),
                    EntryFunction::new(entry).expect("entry function"),
                )
            })
            .collect();
        let spec = ModuleRenderSpec::new(
            PathBuf::from(file),
            ModuleName::parse(module).expect("module name"),
            targets,
        )
        .expect("module spec");
        config.push(spec).expect("unique source file");
    }
    config
}

#[test]
fn snapshot_single_stdout_driver() {
    let config = configuration(&[("src/Foo.elm", "Foo", &[("::stdout", "view")])]);
    let driver = DriverProgram::from_configuration(&config, FormatOptions::default()).render();
    insta::assert_snapshot!("single_stdout_driver", driver);
}

#[test]
fn snapshot_multi_module_driver() {
    let config = configuration(&[
        (
            "src/Pages/Home.elm",
            "Pages.Home",
            &[("index.html", "view"), ("::stdout", "preview")],
        ),
        ("src/About.elm", "About", &[("about.html", "view")]),
    ]);
    let format = FormatOptions {
        indent: 2,
        new_lines: false,
    };
    let driver = DriverProgram::from_configuration(&config, format).render();
    insta::assert_snapshot!("multi_module_driver", driver);
}
