//! The `nepqgen init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("nepqgen.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("papers").context("failed to create papers/")?;
    write_if_missing(Path::new("papers/example-questions.json"), EXAMPLE_QUESTIONS)?;
    write_if_missing(Path::new("papers/example-paper.toml"), EXAMPLE_PAPER)?;

    println!("\nNext steps:");
    println!("  1. Set GEMINI_API_KEY (or edit nepqgen.toml) and add your prompt templates");
    println!("  2. Run: nepqgen validate --questions papers/example-questions.json");
    println!("  3. Run: nepqgen evaluate --questions papers/example-questions.json --paper papers/example-paper.toml");
    println!("  4. Run: nepqgen generate --syllabus <syllabus.txt> --paper papers/example-paper.toml --offline");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# nepqgen configuration

default_provider = "gemini"
default_model = "gemini-1.5-flash"
default_temperature = 0.7
max_retries = 3
retry_delay_ms = 1000
parallelism = 4
output_dir = "./nepqgen-output"

# Prompt templates: a file path or inline text. Without a question template
# every question set is filled from the built-in fallback questions.
# question_prompt_template = "prompts/question-set.txt"
# syllabus_prompt_template = "prompts/syllabus.txt"
# system_prompt = "prompts/system.txt"

# Rubric overriding the built-in NEP 2020 bands and weights.
# rubric = "rubric.toml"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;

const EXAMPLE_QUESTIONS: &str = r#"{
  "questions": [
    {
      "text": "Which normal form removes partial dependencies?",
      "type": "mcq",
      "marks": 1,
      "cognitive_level": "remember",
      "topic": "Normalization",
      "options": ["1NF", "2NF", "3NF", "BCNF"],
      "answer": "2NF"
    },
    {
      "text": "Define a candidate key.",
      "type": "short",
      "marks": 2,
      "cognitive_level": "remember",
      "topic": "Keys"
    },
    {
      "text": "Explain the difference between a primary key and a foreign key.",
      "type": "short",
      "marks": 3,
      "cognitive_level": "understand",
      "topic": "Keys"
    },
    {
      "text": "Explain why transactions need isolation.",
      "type": "short",
      "marks": 3,
      "cognitive_level": "understand",
      "topic": "Transactions"
    },
    {
      "text": "Apply the rules of 3NF to decompose the given student enrolment relation.",
      "type": "application",
      "marks": 5,
      "cognitive_level": "apply",
      "topic": "Normalization"
    },
    {
      "text": "A library system records loans in one table. Design a practical schema that avoids update anomalies.",
      "type": "case_study",
      "marks": 8,
      "cognitive_level": "apply",
      "topic": "Design"
    },
    {
      "text": "Analyze the query plan for a join between two large tables and compare index strategies.",
      "type": "problem_solving",
      "marks": 6,
      "cognitive_level": "analyze",
      "topic": "Indexing"
    },
    {
      "text": "Evaluate whether a NoSQL store is appropriate for a real-world banking ledger.",
      "type": "long",
      "marks": 10,
      "cognitive_level": "evaluate",
      "topic": "Data Models"
    }
  ]
}
"#;

const EXAMPLE_PAPER: &str = r#"title = "Database Systems: Unit Test"
subject = "Database Management Systems"
total_marks = 38
difficulty = 5
priority_topics = ["Normalization", "Transactions"]
instructions = "Prefer questions grounded in practical scenarios."

[[question_sets]]
type = "mcq"
marks = 1
count = 4

[[question_sets]]
type = "short"
marks = 3
count = 3

[[question_sets]]
type = "application"
marks = 5
count = 3

[[question_sets]]
type = "long"
marks = 10
count = 1
"#;
