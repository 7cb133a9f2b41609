// Prompt scaffolding for the fitment report.
// Section labels are never typed here: the output-format block is generated
// from `ReportSection`, which the report parser also matches against.

use crate::fitment::sections::ReportSection;

/// Column headers of the skill comparison table. Four cells, matching the
/// renderer's four fixed-width columns.
pub const SKILL_TABLE_COLUMNS: [&str; 4] = [
    "Skill",
    "\"Can Do\" Level",
    "\"Should Do\" Level",
    "Matching Score",
];

const TASK_PREAMBLE: &str = "\
### Task: Generate a candidate shortlisting report.
### Instructions:
You are a highly intelligent and unbiased system designed to shortlist candidates for a job based on:
1. The candidate's resume.
2. A provided job description.
3. Relevant company culture data retrieved from the vector database.
### Key Objectives:
- Analyze skills, qualifications, and experiences in the resume.
- Evaluate alignment with the job description.
- Assess cultural fit using company culture data.
- Provide detailed scoring, strengths, weaknesses, and recommendations.
### Required Sections in the Report:
- Candidate Name and Email
- Parse the job description and create a 'Should Do' list, categorizing required skills into levels: Beginner, Competent, Intermediate, Expert.
- Parse the candidate's resume and create a 'Can Do' list, categorizing listed skills into the same levels: Beginner, Competent, Intermediate, Expert.
- Matching score: A detailed table showing alignment of skills.
- Analysis of strengths and weaknesses.
- Recommendations for improvement.
- Overall conclusion.
";

const FORMAT_RULES: &str = "\
### Formatting Rules:
- Write every section heading on its own line, exactly as shown above, with nothing else on that line.
- Write list items as lines starting with \"- \".
- Write every table row as | cell | cell | cell | cell | with exactly four cells.
- Write the overall score as a number followed by %, e.g. Overall Matching Score: 78%.
Note: Do not generate the words 'Ok' or 'Okay', and do not open with sentences such as \
'Okay, I will generate a candidate shortlisting report for ...'. Start directly with section 1.
";

/// Builds the fitment prompt. Deterministic: the same inputs always produce
/// the same string, and input text is embedded verbatim (no placeholder
/// substitution inside user-provided text).
pub fn build_fitment_prompt(resume_text: &str, job_description: &str, context: &str) -> String {
    let mut prompt = String::with_capacity(
        TASK_PREAMBLE.len() + FORMAT_RULES.len() + resume_text.len() + job_description.len()
            + context.len()
            + 1024,
    );

    prompt.push_str(TASK_PREAMBLE);
    prompt.push_str("### Input Data:\n");
    prompt.push_str("- **Resume**: ");
    prompt.push_str(resume_text);
    prompt.push_str("\n- **Job Description**: ");
    prompt.push_str(job_description);
    prompt.push_str("\n- **Company Culture Data**: ");
    prompt.push_str(context);
    prompt.push_str("\n### Output Format:\n");
    prompt.push_str(&output_format_block());
    prompt.push_str(FORMAT_RULES);
    prompt
}

/// The numbered section list the model must reproduce.
pub fn output_format_block() -> String {
    let mut block = String::new();
    for section in ReportSection::ALL {
        block.push_str(&section.heading());
        match section {
            ReportSection::SkillComparisonTable => {
                block.push('\n');
                block.push_str(&table_row(&SKILL_TABLE_COLUMNS));
                block.push('\n');
                block.push_str(&table_row(&["---"; 4]));
            }
            ReportSection::OverallMatchingScore => block.push_str(" [Percentage]"),
            _ => {}
        }
        block.push('\n');
    }
    block
}

fn table_row(cells: &[&str; 4]) -> String {
    format!("   | {} |", cells.join(" | "))
}
