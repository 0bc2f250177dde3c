//! Example questions offered by the chat UIs.

use serde::Serialize;

/// A titled group of example questions.
#[derive(Clone, Debug, Serialize)]
pub struct ExampleGroup {
    pub label: &'static str,
    pub questions: &'static [&'static str],
}

pub const EXAMPLE_GROUPS: &[ExampleGroup] = &[
    ExampleGroup {
        label: "General Questions",
        questions: &[
            "What is the current population of Tokyo?",
            "Calculate the square root of 144",
            "Write a Python function to sort a list",
            "What are the latest developments in AI?",
            "Explain quantum computing in simple terms",
        ],
    },
    ExampleGroup {
        label: "Research & Analysis",
        questions: &[
            "Search for recent papers on machine learning",
            "What is the weather like today?",
            "Create a simple bar chart using Python",
            "Convert 100 USD to EUR",
            "What are the benefits of renewable energy?",
        ],
    },
    ExampleGroup {
        label: "File Analysis",
        questions: &[
            "Analyze this image and describe what you see",
            "Extract text from this image using OCR",
            "Summarize the content of this document",
            "Analyze the data in this CSV file",
            "What insights can you find in this Excel file?",
        ],
    },
];
