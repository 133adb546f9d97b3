//! Prompt Text
//!
//! Instruction strings for generation, continuation and review turns.

use crate::models::document::DocumentKind;

/// Sent after every truncated reply
pub const CONTINUE_INSTRUCTION: &str = "Your previous answer was cut off. Continue exactly \
where it stopped. Reply with only the remaining part of the document inside a new fenced \
block with the same label, without repeating anything already written.";

/// Stands in for an empty model reply in the history; providers reject
/// empty assistant turns
pub const EMPTY_REPLY_PLACEHOLDER: &str = "(no output)";

/// System instruction pinning the reply format
pub fn system_instruction(kind: DocumentKind) -> String {
    format!(
        "Always answer with the content of a {name} file only. Start the answer with \
         \"```{label}\" and end it with \"```\". If you want to add remarks, write them \
         as comments inside the file.",
        name = kind.extension().to_uppercase(),
        label = kind.fence_label(),
    )
}

/// Seed for turning an architecture diagram into a template
pub fn template_generation_seed(allowed_types: &[String]) -> String {
    format!(
        "Create a CloudFormation template (YAML) that deploys the architecture shown in \
         the attached diagram.\n\
         The template must satisfy all of the following:\n\
         - include every resource the diagram needs, with its settings\n\
         - define dependencies and references between resources as the diagram shows them\n\
         - use no resource types other than the ones listed below\n\
         \n\
         <resource_types>\n{}\n</resource_types>",
        allowed_types.join("\n")
    )
}

/// Seed for turning a template into a parameter sheet
pub fn parameter_sheet_seed(sample_sheet: &str, template: &str) -> String {
    format!(
        "Using the format of the sample parameter sheet as a reference, create a parameter \
         sheet (CSV) that reflects the CloudFormation template below.\n\
         The parameter sheet must satisfy all of the following:\n\
         - include every resource in the template, with its settings\n\
         - record dependencies and references between resources as the template defines them\n\
         \n\
         <sample_parameter_sheet>\n```csv\n{}\n```\n</sample_parameter_sheet>\n\
         \n\
         <cloudformation_template>\n```yaml\n{}\n```\n</cloudformation_template>",
        sample_sheet.trim_end(),
        template.trim_end()
    )
}

/// Seed for repairing a rejected document.
///
/// The document and the validator feedback are embedded verbatim.
pub fn review_seed(kind: DocumentKind, document: &str, feedback: &str) -> String {
    format!(
        "The {name} below was rejected by the validator. Fix every problem the validator \
         reports and return the corrected {name} in full, not a diff.\n\
         \n\
         <validator_feedback>\n{feedback}\n</validator_feedback>\n\
         \n\
         <current_document>\n```{label}\n{document}\n```\n</current_document>",
        name = kind.display_name(),
        label = kind.fence_label(),
        feedback = feedback,
        document = document,
    )
}
