use std::fmt::Write as _;

use crate::domain::{module_name::RESERVED_MODULE_NAME, render_config::RenderConfiguration};

const SUPPORT_IMPORTS: &[&str] = &[
    "import Platform",
    "import Html exposing (Html)",
    "import ElmHtml.InternalTypes exposing (decodeElmHtml)",
    "import ElmHtml.ToString exposing (FormatOptions, defaultFormatOptions, nodeToStringWithOptions)",
    "import Json.Decode as Json",
    "import Native.Jsonify",
];

const AS_JSON_STRING: &str = "asJsonString : Html msg -> String
asJsonString =
    Native.Jsonify.stringify";

const DECODE: &str = "decode : ( String, Html msg ) -> ( String, String )
decode ( output, view ) =
    case Json.decodeString (decodeElmHtml (\\_ _ -> Json.succeed ())) (asJsonString view) of
        Err message ->
            ( output, message )

        Ok node ->
            ( output, nodeToStringWithOptions formatOptions node )";

const MAIN: &str = "main : Program Never () ()
main =
    Platform.program
        { init = ( (), htmlOut htmlPairs )
        , update = \\_ model -> ( model, Cmd.none )
        , subscriptions = \\_ -> Sub.none
        }";

const PORT: &str = "port htmlOut : List ( String, String ) -> Cmd msg";

/// Pretty-printing policy applied to every rendered node tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub indent: u8,
    pub new_lines: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            new_lines: true,
        }
    }
}

/// One `decode ( destination, Module.entry )` element of the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewBinding {
    pub destination: String,
    pub module: String,
    pub entry: String,
}

impl ViewBinding {
    fn expression(&self) -> String {
        format!(
            "decode ( {}, {}.{} )",
            elm_string_literal(&self.destination),
            self.module,
            self.entry
        )
    }
}

/// Structured form of the generated `PrivateMain` module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverProgram {
    imports: Vec<String>,
    bindings: Vec<ViewBinding>,
    format: FormatOptions,
}

impl DriverProgram {
    /// Imports follow configuration order (first occurrence wins); bindings
    /// are listed file by file, then target by target.
    pub fn from_configuration(config: &RenderConfiguration, format: FormatOptions) -> Self {
        let mut imports: Vec<String> = Vec::new();
        let mut bindings = Vec::with_capacity(config.target_count());

        for spec in config.specs() {
            let module = spec.module_name().as_str();
            if !imports.iter().any(|existing| existing == module) {
                imports.push(module.to_string());
            }
            bindings.extend(spec.targets().iter().map(|target| ViewBinding {
                destination: target.destination.key(),
                module: module.to_string(),
                entry: target.entry.as_str().to_string(),
            }));
        }

        Self {
            imports,
            bindings,
            format,
        }
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn bindings(&self) -> &[ViewBinding] {
        &self.bindings
    }

    pub fn render(&self) -> String {
        let mut imports = SUPPORT_IMPORTS.join("\n");
        if !self.imports.is_empty() {
            imports.push_str("\n\n");
            let user_imports: Vec<String> = self
                .imports
                .iter()
                .map(|module| format!("import {module}"))
                .collect();
            imports.push_str(&user_imports.join("\n"));
        }

        let declarations = [
            AS_JSON_STRING.to_string(),
            self.render_format_options(),
            DECODE.to_string(),
            self.render_pairs(),
            MAIN.to_string(),
            PORT.to_string(),
        ];

        let mut out = String::new();
        let _ = write!(
            out,
            "port module {RESERVED_MODULE_NAME} exposing (..)\n\n{imports}\n\n\n{}\n",
            declarations.join("\n\n\n")
        );
        out
    }

    fn render_format_options(&self) -> String {
        let new_lines = if self.format.new_lines { "True" } else { "False" };
        format!(
            "formatOptions : FormatOptions\nformatOptions =\n    {{ defaultFormatOptions | newLines = {new_lines}, indent = {} }}",
            self.format.indent
        )
    }

    fn render_pairs(&self) -> String {
        let mut out = String::from("htmlPairs : List ( String, String )\nhtmlPairs =\n");
        if self.bindings.is_empty() {
            out.push_str("    []");
            return out;
        }
        for (index, binding) in self.bindings.iter().enumerate() {
            let lead = if index == 0 { '[' } else { ',' };
            let _ = writeln!(out, "    {lead} {}", binding.expression());
        }
        out.push_str("    ]");
        out
    }
}

/// Quote a value as an Elm string literal.
pub fn elm_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::{
        module_name::ModuleName,
        render_config::{EntryFunction, ModuleRenderSpec, OutputDestination, RenderTarget},
    };

    fn target(output: &str, entry: &str) -> RenderTarget {
        RenderTarget::new(
            OutputDestination::from_key(output),
            EntryFunction::new(entry).expect("entry"),
        )
    }

    fn config(modules: &[(&str, &str, Vec<RenderTarget>)]) -> RenderConfiguration {
        let mut config = RenderConfiguration::new();
        for (file, name, targets) in modules {
            let spec = ModuleRenderSpec::new(
                PathBuf::from(file),
                ModuleName::parse(name).expect("name"),
                targets.clone(),
            )
            .expect("spec");
            config.push(spec).expect("push");
        }
        config
    }

    #[test]
    fn single_stdout_target_imports_module_once() {
        let config = config(&[("Foo.elm", "Foo", vec![target("::stdout", "view")])]);
        let text = DriverProgram::from_configuration(&config, FormatOptions::default()).render();

        assert_eq!(text.matches("\nimport Foo\n").count(), 1);
        assert_eq!(text.matches("Foo.view").count(), 1);
        assert!(text.contains("    [ decode ( \"::stdout\", Foo.view )\n    ]"));
        assert!(text.starts_with("port module PrivateMain exposing (..)\n"));
    }

    #[test]
    fn bindings_follow_file_then_target_order() {
        let config = config(&[
            (
                "B.elm",
                "Beta",
                vec![target("b1.html", "view"), target("b2.html", "viewAlt")],
            ),
            (
                "A.elm",
                "Alpha",
                vec![target("a1.html", "view"), target("::stdout", "summary")],
            ),
        ]);
        let program = DriverProgram::from_configuration(&config, FormatOptions::default());

        assert_eq!(program.imports(), ["Beta", "Alpha"]);
        let order: Vec<_> = program
            .bindings()
            .iter()
            .map(|b| format!("{}={}.{}", b.destination, b.module, b.entry))
            .collect();
        assert_eq!(
            order,
            [
                "b1.html=Beta.view",
                "b2.html=Beta.viewAlt",
                "a1.html=Alpha.view",
                "::stdout=Alpha.summary",
            ]
        );
        assert_eq!(program.render().matches("decode ( \"").count(), 4);
    }

    #[test]
    fn duplicate_module_names_are_imported_once() {
        let config = config(&[
            ("a/Page.elm", "Page", vec![target("a.html", "view")]),
            ("b/Page.elm", "Page", vec![target("b.html", "view")]),
        ]);
        let program = DriverProgram::from_configuration(&config, FormatOptions::default());
        assert_eq!(program.imports(), ["Page"]);
        assert_eq!(program.bindings().len(), 2);
    }

    #[test]
    fn empty_configuration_renders_empty_list() {
        let program =
            DriverProgram::from_configuration(&RenderConfiguration::new(), FormatOptions::default());
        let text = program.render();
        assert!(text.contains("htmlPairs =\n    []\n"));
        assert!(text.contains("import Native.Jsonify\n\n\nasJsonString"));
        assert!(text.ends_with("port htmlOut : List ( String, String ) -> Cmd msg\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let config = config(&[("Foo.elm", "Foo", vec![target("out.html", "view")])]);
        let first = DriverProgram::from_configuration(&config, FormatOptions::default()).render();
        let second = DriverProgram::from_configuration(&config, FormatOptions::default()).render();
        assert_eq!(first, second);
    }

    #[test]
    fn format_options_are_embedded() {
        let format = FormatOptions {
            indent: 2,
            new_lines: false,
        };
        let text = DriverProgram::from_configuration(&RenderConfiguration::new(), format).render();
        assert!(text.contains("{ defaultFormatOptions | newLines = False, indent = 2 }"));
    }

    #[test]
    fn destinations_are_escaped() {
        assert_eq!(elm_string_literal("plain.html"), "\"plain.html\"");
        assert_eq!(
            elm_string_literal("dir\\weird \"name\".html"),
            "\"dir\\\\weird \\\"name\\\".html\""
        );
        assert_eq!(elm_string_literal("a\nb"), "\"a\\nb\"");
    }
}
