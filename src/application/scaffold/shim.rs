use crate::application::manifest::ProjectName;

/// Node.js entry point that loads the compiled artifact, starts the driver
/// worker and prints its single batch of `[destination, html]` pairs as JSON.
pub const RUNNER_SCRIPT: &str = r#"// Generated by elm-static-html. Do not edit.
var path = require('path');
var Elm = require(path.join(__dirname, 'elm.js'));

var worker = Elm.PrivateMain.worker();
worker.ports.htmlOut.subscribe(function (pairs) {
    process.stdout.write(JSON.stringify(pairs));
});
"#;

/// Native module exposing `Native.Jsonify.stringify` to the driver. The
/// variable name must carry the project namespace for the compiler to link it.
pub fn render_shim(project: &ProjectName) -> String {
    format!(
        "var _{project}$Native_Jsonify = {{\n    stringify: function(thing) {{ return JSON.stringify(thing); }}\n}};\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shim_is_namespaced_by_project() {
        let project = ProjectName::from_repository("https://github.com/user/my-project.git")
            .expect("project");
        assert_eq!(
            render_shim(&project),
            "var _user$my_project$Native_Jsonify = {\n    stringify: function(thing) { return JSON.stringify(thing); }\n};\n"
        );
    }

    #[test]
    fn runner_subscribes_to_driver_port() {
        assert!(RUNNER_SCRIPT.contains("Elm.PrivateMain.worker()"));
        assert!(RUNNER_SCRIPT.contains("ports.htmlOut.subscribe"));
    }
}
