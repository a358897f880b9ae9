//! Resolution of command templates into action requests.

use crate::models::{ActionRequest, CommandTemplates, InstanceMap, Verdict};

/// Placeholder replaced with the routing instance name.
pub const PLACEHOLDER: &str = "$routing-instance-name";

/// Short form of [`PLACEHOLDER`]. Only matches when not followed by an
/// identifier character, so `$rib` is left alone.
pub const PLACEHOLDER_SHORT: &str = "$ri";

/// Build the action for an instance, if any.
///
/// Returns `None` for `Undetermined` or when the template for the verdict is
/// empty. The resulting command is not quoted or escaped.
pub fn resolve(
    instance_name: &str,
    verdict: Verdict,
    pass_template: &str,
    fail_template: &str,
) -> Option<ActionRequest> {
    let template = match verdict {
        Verdict::Pass => pass_template,
        Verdict::Fail => fail_template,
        Verdict::Undetermined => return None,
    };

    if template.is_empty() {
        return None;
    }

    Some(ActionRequest {
        instance_name: instance_name.to_string(),
        verdict,
        resolved_command: substitute_instance(template, instance_name),
    })
}

/// Resolve actions for all classified instances, in map order.
pub fn resolve_all(instances: &InstanceMap, templates: &CommandTemplates) -> Vec<ActionRequest> {
    instances
        .iter()
        .filter_map(|stats| resolve(&stats.name, stats.verdict, &templates.pass, &templates.fail))
        .collect()
}

/// Replace every placeholder in `template` with `instance_name`.
///
/// Single left-to-right pass; inserted names are never scanned again.
pub fn substitute_instance(template: &str, instance_name: &str) -> String {
    let mut out = String::with_capacity(template.len() + instance_name.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix(PLACEHOLDER) {
            out.push_str(instance_name);
            rest = after;
        } else if let Some(after) = tail
            .strip_prefix(PLACEHOLDER_SHORT)
            .filter(|after| !starts_with_ident_char(after))
        {
            out.push_str(instance_name);
            rest = after;
        } else {
            out.push('$');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

fn starts_with_ident_char(s: &str) -> bool {
    s.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
