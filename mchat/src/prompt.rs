//! System instruction, canned replies, and the food-topic guard.

use mprovider::{Message, Role, ToolDefinition};

/// Sent verbatim, without contacting any provider, when a conversation is
/// not about food or restaurants.
pub const OFF_TOPIC_REFUSAL: &str = "I'm sorry, but I can only help with food and restaurant \
     recommendations. Is there something food-related I can help you find?";

/// Returned when the follow-up generation after tool execution fails.
pub const FINAL_ANSWER_APOLOGY: &str = "I'm sorry, I gathered some information but ran into a \
     problem putting together my answer. Please try asking again in a moment.";

const PERSONA: &str = "You are Morsel, a friendly and knowledgeable restaurant recommendation \
     assistant. You help people find great places to eat, compare restaurants, and discover \
     dishes worth trying. Give concrete suggestions with names, neighbourhoods, and what to \
     order, and say so when you are unsure.";

pub fn system_prompt(tools: &[ToolDefinition]) -> String {
    let tool_summary = if tools.is_empty() {
        "No search tools are available right now; answer from your own knowledge and mention \
         that your information may be out of date."
            .to_string()
    } else {
        let lines = tools
            .iter()
            .map(|tool| format!("- {}: {}", tool.name, tool.description))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "You can use these tools when current or local information would improve your \
             answer:\n{lines}\nIf a tool reports an error, explain the limitation briefly and \
             still give your best recommendation."
        )
    };

    format!(
        "{PERSONA}\n\n{tool_summary}\n\nOnly discuss food, drinks, restaurants, and dining. If \
         the user asks about anything else, reply with exactly this sentence and nothing \
         more: \"{OFF_TOPIC_REFUSAL}\""
    )
}

const FOOD_TERMS: &[&str] = &[
    "appetizer", "bagel", "bakery", "bar", "barbecue", "bbq", "beer", "bistro", "breakfast",
    "brewery", "brunch", "burger", "burrito", "cafe", "café", "chef", "cocktail", "coffee",
    "cuisine", "curry", "deli", "delivery", "dessert", "diner", "dinner", "dish", "dumpling",
    "eat", "eatery", "eateries", "eating", "food", "foodie", "grill", "hungry", "lunch", "meal",
    "menu", "noodle", "pasta", "pho", "pizza", "pizzeria", "ramen", "reservation",
    "restaurant", "sandwich", "seafood", "slice", "snack", "steak", "steakhouse", "sushi", "taco",
    "takeout", "tapas", "tea", "vegan", "vegetarian", "wine",
];

fn matches_term(word: &str) -> bool {
    FOOD_TERMS.iter().any(|term| {
        word == *term
            || word.strip_suffix('s') == Some(*term)
            || word.strip_suffix("es") == Some(*term)
    })
}

/// Whether `text` mentions any food or dining vocabulary.
pub fn mentions_food(text: &str) -> bool {
    words(text).any(|word| matches_term(&word))
}

/// Words that refine an earlier food request without naming food again.
const REFINEMENT_TERMS: &[&str] = &[
    "affordable", "alternative", "another", "budget", "cheap", "cheaper", "closer", "else",
    "friendly", "hours", "instead", "near", "nearby", "open", "option", "other", "outdoor",
    "parking", "patio", "price", "rated", "reserve", "review",
];

/// Replies this short are read as follow-ups to the previous request.
const FOLLOW_UP_MAX_WORDS: usize = 3;

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

fn is_follow_up(text: &str) -> bool {
    words(text).count() <= FOLLOW_UP_MAX_WORDS
        || words(text).any(|word| {
            REFINEMENT_TERMS.iter().any(|term| {
                word == *term || word.strip_suffix('s') == Some(*term)
            })
        })
}

/// Whether a conversation may be forwarded to a provider.
///
/// The latest user message decides. It passes on its own when it mentions
/// food; otherwise it passes only as a short or refining follow-up to an
/// earlier user message that did.
pub fn is_on_topic(conversation: &[Message]) -> bool {
    let mut user_messages = conversation
        .iter()
        .rev()
        .filter(|message| message.role == Role::User);

    let Some(latest) = user_messages.next() else {
        return false;
    };
    if mentions_food(&latest.content) {
        return true;
    }

    is_follow_up(&latest.content) && user_messages.any(|message| mentions_food(&message.content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn food_vocabulary_is_detected_by_whole_words() {
        assert!(mentions_food("Best pizza in Brooklyn"));
        assert!(mentions_food("any good RESTAURANTS near the park?"));
        assert!(mentions_food("where should we eat tonight"));
        assert!(mentions_food("late-night tacos?"));
        assert!(!mentions_food("What's the capital of France?"));
        assert!(!mentions_food("I barely slept"));
    }

    #[test]
    fn latest_user_message_decides_the_topic() {
        let history = |latest: &str| {
            vec![
                Message::system("be brief"),
                Message::user("Best pizza in Brooklyn?"),
                Message::assistant("Lucali and Di Fara are both excellent."),
                Message::user(latest),
            ]
        };

        assert!(is_on_topic(&history("What about Queens?")));
        assert!(is_on_topic(&history("Anything cheaper that is open late tonight?")));
        assert!(is_on_topic(&history("Any good sushi instead?")));
        assert!(!is_on_topic(&history("Write my tax return")));
        assert!(!is_on_topic(&history(
            "Now explain how quantum computers factor large integers"
        )));
    }

    #[test]
    fn short_replies_without_food_history_are_off_topic() {
        assert!(!is_on_topic(&[Message::user("What about Queens?")]));
        assert!(!is_on_topic(&[Message::assistant("Hungry?")]));
        assert!(!is_on_topic(&[]));
    }

    #[test]
    fn system_prompt_lists_tools_and_refusal() {
        let prompt = system_prompt(&[ToolDefinition {
            name: "search_web".to_string(),
            description: "Search the web".to_string(),
            input_schema: "{}".to_string(),
        }]);

        assert!(prompt.contains("- search_web: Search the web"));
        assert!(prompt.contains(OFF_TOPIC_REFUSAL));

        let bare = system_prompt(&[]);
        assert!(bare.contains("No search tools are available"));
    }
}
