//! Prompt templates for the three pipeline stages.
//!
//! Descriptions are embedded verbatim; nothing is escaped.

use crate::types::Category;

pub fn classification_prompt(description: &str) -> String {
    format!(
        "Classify the following support ticket description into one of these categories: \
         billing, technical, or general.\n\
         \n\
         Return only a single word for the category.\n\
         \n\
         Description: \"{description}\"\n\
         Category:"
    )
}

pub fn priority_prompt(description: &str) -> String {
    format!(
        "Analyze the sentiment and keywords of the following support ticket description \
         to determine its priority: low, medium, or high.\n\
         \n\
         Return only a single word for the priority.\n\
         \n\
         Description: \"{description}\"\n\
         Priority:"
    )
}

pub fn resolution_prompt(description: &str, category: Category) -> String {
    format!(
        "You are a helpful customer support agent. Based on the ticket description and its \
         classified category, provide a concise and helpful first response.\n\
         \n\
         If a simple solution is possible (like resetting a password), start your answer with \
         \"Suggested Solution:\" followed by the steps.\n\
         Otherwise, inform the user that the ticket has been escalated to the appropriate team.\n\
         \n\
         Category: {category}\n\
         Description: \"{description}\"\n\
         \n\
         Suggested Response:"
    )
}
