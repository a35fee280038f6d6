//! Task prompt rendering for one feature.

use crate::backlog::{Feature, ProjectContext};
use crate::signals::{BLOCKED_TOKEN, COMPLETE_TOKEN, FAILED_TOKEN};

/// Render the self-contained task description the agent receives on stdin.
///
/// The completion tokens are spelled out exactly because the detector does a
/// literal substring match on them.
pub fn build_prompt(feature: &Feature, context: Option<&ProjectContext>) -> String {
    let project_section = context
        .filter(|c| c.has_content())
        .map(render_context)
        .unwrap_or_default();

    format!(
        r#"You are an incremental development agent focused on implementing a single feature.

{project_section}## CURRENT TASK: {title}

{description}

## STEPS
1. Review the project structure and its current state
2. Implement ONLY this feature - do not implement any other feature
3. Write clear, production-quality code with proper error handling
4. If tests apply, run them and make sure the feature works
5. Make sure the code has no obvious bugs

## COMPLETION SIGNAL
When you are done, output exactly one of these signals in your response:
- "{complete}" - the feature is complete
- "{blocked}" - human intervention is required before work can continue
- "{failed}" - you hit an error you cannot resolve

Do not worry about whether the whole project is finished. Focus on the current feature only.
"#,
        title = feature.title,
        description = feature.description,
        complete = COMPLETE_TOKEN,
        blocked = BLOCKED_TOKEN,
        failed = FAILED_TOKEN,
    )
}

fn render_context(context: &ProjectContext) -> String {
    let mut section = String::from("## PROJECT CONTEXT\n\n");
    section.push_str(&format!(
        "- **Name**: {}\n",
        context.name.as_deref().unwrap_or("Unknown")
    ));

    let fields = [
        ("Description", context.description.clone()),
        ("Tech stack", context.tech_stack.as_ref().map(|t| t.to_string())),
        ("Architecture", context.architecture.clone()),
        ("Development approach", context.development_approach.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            section.push_str(&format!("- **{}**: {}\n", label, value));
        }
    }
    section.push('\n');

    let standards: Vec<&String> = context
        .code_standards
        .iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
    if !standards.is_empty() {
        section.push_str("## CODE STANDARDS\n\n");
        for standard in standards {
            section.push_str(&format!("- {}\n", standard));
        }
        section.push('\n');
    }

    section
}
