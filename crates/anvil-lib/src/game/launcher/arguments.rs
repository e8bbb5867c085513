/// Argument template expansion for launch scripts
use crate::game::launcher::types::{AuthSession, LaunchContext};
use crate::game::launcher::version_parser::VersionDescriptor;
use crate::utils::paths::absolute_path;
use std::collections::HashMap;
use std::path::Path;

/// Token bound to the reconstructed virtual asset root
pub const GAME_ASSETS_TOKEN: &str = "game_assets";

/// Piece of a scanned template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// Text outside any placeholder
    Literal(&'a str),
    /// `${key}` placeholder; `raw` is the full `${key}` text
    Token { key: &'a str, raw: &'a str },
}

/// Split a template into literal text and `${key}` placeholders.
///
/// Matching is non-greedy: a placeholder runs from `${` to the first `}`
/// after it. A `${` with no closing brace is literal text.
fn scan(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0usize;

    while let Some(rel) = template[cursor..].find("${") {
        let start = cursor + rel;
        let key_start = start + 2;
        let Some(end_rel) = template[key_start..].find('}') else {
            break;
        };
        let end = key_start + end_rel;

        if start > cursor {
            segments.push(Segment::Literal(&template[cursor..start]));
        }
        segments.push(Segment::Token {
            key: &template[key_start..end],
            raw: &template[start..=end],
        });
        cursor = end + 1;
    }

    if cursor < template.len() {
        segments.push(Segment::Literal(&template[cursor..]));
    }

    segments
}

fn resolve<'a>(key: &str, raw: &'a str, variables: &'a HashMap<String, String>) -> &'a str {
    variables.get(key).map(String::as_str).unwrap_or(raw)
}

/// Substitute variables in a string.
/// Unknown placeholders are left in place as `${key}`.
pub fn substitute_variables(text: &str, variables: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(text.len());

    for segment in scan(text) {
        match segment {
            Segment::Literal(s) => result.push_str(s),
            Segment::Token { key, raw } => result.push_str(resolve(key, raw, variables)),
        }
    }

    result
}

/// Expand a template into separate arguments.
///
/// Only whitespace written in the template itself separates arguments; a
/// substituted value is atomic, so a path containing spaces stays a single
/// argument. A placeholder that expands to an empty string still yields an
/// (empty) argument.
pub fn expand_arguments(template: &str, variables: &HashMap<String, String>) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut pending = false;

    for segment in scan(template) {
        match segment {
            Segment::Literal(s) => {
                for c in s.chars() {
                    if c.is_whitespace() {
                        if pending {
                            args.push(std::mem::take(&mut current));
                            pending = false;
                        }
                    } else {
                        current.push(c);
                        pending = true;
                    }
                }
            }
            Segment::Token { key, raw } => {
                current.push_str(resolve(key, raw, variables));
                pending = true;
            }
        }
    }

    if pending {
        args.push(current);
    }

    args
}

/// Keys of every placeholder in the template, in order of appearance
pub fn template_tokens(template: &str) -> Vec<&str> {
    scan(template)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Token { key, .. } => Some(key),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Build the game variable map for a descriptor's argument template.
///
/// `game_assets` is the reconstructed virtual asset root, when the template
/// needed one.
pub fn build_game_variables(
    session: &AuthSession,
    descriptor: &VersionDescriptor,
    ctx: &LaunchContext,
    game_assets: Option<&Path>,
) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    // Player info
    vars.insert("auth_username".to_string(), session.username.clone());
    vars.insert("auth_session".to_string(), session.session_token.clone());
    vars.insert("auth_access_token".to_string(), session.access_token.clone());
    vars.insert("auth_player_name".to_string(), session.player_name.clone());
    vars.insert("auth_uuid".to_string(), session.uuid.clone());
    vars.insert("user_type".to_string(), session.user_type.clone());
    vars.insert(
        "user_properties".to_string(),
        session.serialized_user_properties.clone(),
    );

    // Instance / version info
    vars.insert("profile_name".to_string(), ctx.profile_name.clone());
    vars.insert("version_name".to_string(), descriptor.id.clone());

    // Directories
    vars.insert(
        "game_directory".to_string(),
        absolute_path(&ctx.game_dir).to_string_lossy().to_string(),
    );
    if let Some(assets) = game_assets {
        vars.insert(
            GAME_ASSETS_TOKEN.to_string(),
            absolute_path(assets).to_string_lossy().to_string(),
        );
    }

    // 1.7.3+ asset tokens
    vars.insert(
        "assets_root".to_string(),
        absolute_path(&ctx.paths.assets_dir())
            .to_string_lossy()
            .to_string(),
    );
    vars.insert("assets_index_name".to_string(), descriptor.assets_id.clone());

    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_variables() {
        let vars = vars(&[("name", "World")]);
        assert_eq!(
            substitute_variables("Hello ${name} ${missing}", &vars),
            "Hello World ${missing}"
        );
    }

    #[test]
    fn test_substitute_variables_no_match() {
        let vars = HashMap::new();
        let result = substitute_variables("--username ${username}", &vars);
        assert_eq!(result, "--username ${username}");
    }

    #[test]
    fn substitution_is_non_greedy() {
        let vars = vars(&[("a", "1"), ("b", "2")]);
        assert_eq!(substitute_variables("${a}-${b}", &vars), "1-2");
        assert_eq!(substitute_variables("x${a}}y", &vars), "x1}y");
        // The key runs to the first closing brace, so "${a${b}" has key "a${b"
        assert_eq!(substitute_variables("${a${b}}", &vars), "${a${b}}");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        let vars = vars(&[("a", "1")]);
        assert_eq!(substitute_variables("${a} ${a", &vars), "1 ${a");
        assert_eq!(substitute_variables("$ {a} $a }", &vars), "$ {a} $a }");
    }

    #[test]
    fn values_are_not_rescanned() {
        let vars = vars(&[("a", "${b}"), ("b", "2")]);
        assert_eq!(substitute_variables("${a}", &vars), "${b}");
    }

    #[test]
    fn empty_key_uses_binding_when_present() {
        assert_eq!(substitute_variables("${}", &HashMap::new()), "${}");
        assert_eq!(substitute_variables("${}", &vars(&[("", "e")])), "e");
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        let vars = vars(&[("name", "Jörg")]);
        assert_eq!(substitute_variables("héllo ${name} ✓", &vars), "héllo Jörg ✓");
    }

    #[test]
    fn expand_arguments_splits_on_template_whitespace() {
        let vars = vars(&[("auth_player_name", "Steve"), ("version_name", "1.6.4")]);
        let args = expand_arguments(
            "--username ${auth_player_name}  --version ${version_name} --demo",
            &vars,
        );
        assert_eq!(
            args,
            vec!["--username", "Steve", "--version", "1.6.4", "--demo"]
        );
    }

    #[test]
    fn expanded_values_with_spaces_stay_single_arguments() {
        let vars = vars(&[("game_directory", "/home/me/My Instances/test")]);
        let template = "--gameDir ${game_directory} --prefix=${game_directory}/x";

        let args = expand_arguments(template, &vars);
        assert_eq!(
            args,
            vec![
                "--gameDir",
                "/home/me/My Instances/test",
                "--prefix=/home/me/My Instances/test/x",
            ]
        );

        // Substituting first and then splitting the result breaks the path apart.
        let substitute_then_split: Vec<String> = substitute_variables(template, &vars)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        assert_eq!(substitute_then_split.len(), 5);
        assert_ne!(substitute_then_split, args);
    }

    #[test]
    fn unknown_placeholder_survives_as_one_argument() {
        let template = "--a ${not known} --b";
        let args = expand_arguments(template, &HashMap::new());
        assert_eq!(args, vec!["--a", "${not known}", "--b"]);

        // Splitting the raw template before substitution cuts the placeholder in two.
        let split_then_substitute: Vec<String> = template
            .split_whitespace()
            .map(|piece| substitute_variables(piece, &HashMap::new()))
            .collect();
        assert_eq!(split_then_substitute, vec!["--a", "${not", "known}", "--b"]);
    }

    #[test]
    fn empty_expansion_keeps_its_slot() {
        let vars = vars(&[("user_properties", "")]);
        let args = expand_arguments("--userProperties ${user_properties} --x", &vars);
        assert_eq!(args, vec!["--userProperties", "", "--x"]);
        assert!(expand_arguments("   ", &vars).is_empty());
    }

    #[test]
    fn template_tokens_lists_keys() {
        assert_eq!(
            template_tokens("--a ${one} --b ${two}${three} ${unterminated"),
            vec!["one", "two", "three"]
        );
    }
}
