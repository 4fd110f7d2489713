//! Intent Parser
//!
//! Classifies a free-text utterance into a tagged intent plus extracted
//! arguments. The parser is an ordered list of rules evaluated in fixed
//! precedence; the first rule that extracts a value wins, even when a later
//! pattern would also match. That ordering is deliberate disambiguation:
//! "add bread to my order" is an Add, not a PlaceOrder, because the add rule
//! runs first.
//!
//! `classify` is a total function: it always returns exactly one variant and
//! never panics, no matter the input.

use serde::{Deserialize, Serialize};

/// The classified purpose of a single utterance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Add { quantity: u32, item: String },
    Remove { item: String },
    Update { item: String, quantity: u32 },
    ShowCart,
    PlaceOrder,
    RecipeRequest { dish: String },
    Browse,
    Unknown,
}

/// Classifies an utterance. Precedence: recipe-request, add, remove,
/// update, show-cart, place-order, browse, unknown.
pub fn classify(utterance: &str) -> Intent {
    let tokens = tokenize(utterance);
    if tokens.is_empty() {
        return Intent::Unknown;
    }

    let rules: [fn(&[String]) -> Option<Intent>; 7] = [
        recipe_rule,
        add_rule,
        remove_rule,
        update_rule,
        show_cart_rule,
        place_order_rule,
        browse_rule,
    ];
    for rule in rules {
        if let Some(intent) = rule(&tokens) {
            return intent;
        }
    }
    Intent::Unknown
}

/// Lowercases, drops punctuation, splits on whitespace.
fn tokenize(utterance: &str) -> Vec<String> {
    utterance
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '\'' || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Words that carry no item information when they lead the item span.
const FILLER: &[&str] = &["of", "the", "some", "a", "an", "my", "to", "please", "me"];

fn strip_leading_filler(tokens: &[String]) -> &[String] {
    let mut rest = tokens;
    while let Some((first, more)) = rest.split_first() {
        if FILLER.contains(&first.as_str()) {
            rest = more;
        } else {
            break;
        }
    }
    rest
}

/// Finds the first occurrence of a trigger phrase on token boundaries and
/// returns the tokens after it.
fn after_trigger<'a>(tokens: &'a [String], triggers: &[&str]) -> Option<&'a [String]> {
    for trigger in triggers {
        let phrase: Vec<&str> = trigger.split_whitespace().collect();
        if phrase.is_empty() || phrase.len() > tokens.len() {
            continue;
        }
        for start in 0..=(tokens.len() - phrase.len()) {
            if tokens[start..start + phrase.len()]
                .iter()
                .zip(&phrase)
                .all(|(t, p)| t == p)
            {
                return Some(&tokens[start + phrase.len()..]);
            }
        }
    }
    None
}

fn contains_phrase(tokens: &[String], triggers: &[&str]) -> bool {
    after_trigger(tokens, triggers).is_some()
}

/// Quantity is the first integer token after the trigger, default 1; the
/// item is the trailing span, with leading filler stripped.
fn quantity_and_item(rest: &[String]) -> (u32, String) {
    let rest = strip_leading_filler(rest);
    if let Some((first, more)) = rest.split_first() {
        if let Ok(quantity) = first.parse::<u32>() {
            let item = strip_leading_filler(more).join(" ");
            return (quantity.max(1), item);
        }
    }
    (1, rest.join(" "))
}

fn recipe_rule(tokens: &[String]) -> Option<Intent> {
    let rest = after_trigger(
        tokens,
        &[
            "ingredients for",
            "recipe for",
            "what do i need for",
            "i want to cook",
            "i want to make",
            "how do i make",
        ],
    )?;
    let dish = strip_leading_filler(rest).join(" ");
    if dish.is_empty() {
        return None;
    }
    Some(Intent::RecipeRequest { dish })
}

fn add_rule(tokens: &[String]) -> Option<Intent> {
    let rest = after_trigger(
        tokens,
        &[
            "add",
            "i want",
            "i'd like",
            "can i get",
            "get me",
            "give me",
            "buy",
            "i need",
            "order",
        ],
    )?;
    let (quantity, item) = quantity_and_item(rest);
    // A bare trigger ("place my order") carries no item; let later rules
    // claim the utterance.
    if item.is_empty() {
        return None;
    }
    Some(Intent::Add { quantity, item })
}

fn remove_rule(tokens: &[String]) -> Option<Intent> {
    let rest = after_trigger(
        tokens,
        &["remove", "delete", "take out", "take off", "get rid of", "drop"],
    )?;
    let item = rest
        .iter()
        .filter(|t| {
            !FILLER.contains(&t.as_str()) && !matches!(t.as_str(), "from" | "cart" | "basket")
        })
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    if item.is_empty() {
        return None;
    }
    Some(Intent::Remove { item })
}

fn update_rule(tokens: &[String]) -> Option<Intent> {
    let rest = after_trigger(tokens, &["change", "update", "set", "make it", "make that"])?;
    // Update needs an explicit quantity somewhere after the trigger.
    let qty_pos = rest.iter().position(|t| t.parse::<u32>().is_ok())?;
    let quantity: u32 = rest[qty_pos].parse().ok()?;
    let item = rest
        .iter()
        .enumerate()
        .filter(|(i, t)| {
            *i != qty_pos && !FILLER.contains(&t.as_str()) && !matches!(t.as_str(), "quantity" | "qty")
        })
        .map(|(_, t)| t.clone())
        .collect::<Vec<_>>()
        .join(" ");
    if item.is_empty() {
        return None;
    }
    Some(Intent::Update { item, quantity })
}

fn show_cart_rule(tokens: &[String]) -> Option<Intent> {
    if contains_phrase(tokens, &["cart", "basket"]) {
        return Some(Intent::ShowCart);
    }
    None
}

fn place_order_rule(tokens: &[String]) -> Option<Intent> {
    if contains_phrase(tokens, &["checkout", "check out", "that's all", "that is all"]) {
        return Some(Intent::PlaceOrder);
    }
    if contains_phrase(tokens, &["order"])
        && contains_phrase(tokens, &["place", "confirm", "submit", "finalize", "complete"])
    {
        return Some(Intent::PlaceOrder);
    }
    None
}

fn browse_rule(tokens: &[String]) -> Option<Intent> {
    if contains_phrase(
        tokens,
        &[
            "what do you have",
            "what do you sell",
            "what can i buy",
            "what's available",
            "whats available",
            "browse",
            "menu",
            "catalog",
            "catalogue",
            "show me",
        ],
    ) {
        return Some(Intent::Browse);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_with_quantity() {
        assert_eq!(
            classify("add 2 bread"),
            Intent::Add {
                quantity: 2,
                item: "bread".into()
            }
        );
    }

    #[test]
    fn add_quantity_defaults_to_one() {
        assert_eq!(
            classify("I'd like some butter"),
            Intent::Add {
                quantity: 1,
                item: "butter".into()
            }
        );
    }

    #[test]
    fn add_quantity_zero_clamps_to_one() {
        // The parser owns the clamp; the cart only accepts positive
        // quantities.
        assert_eq!(
            classify("add 0 bread"),
            Intent::Add {
                quantity: 1,
                item: "bread".into()
            }
        );
    }

    #[test]
    fn add_strips_filler_before_item() {
        assert_eq!(
            classify("add 3 of the eggs please"),
            Intent::Add {
                quantity: 3,
                item: "eggs please".into()
            }
        );
    }

    #[test]
    fn add_beats_generic_order_keyword() {
        // "order" appears, but the add trigger wins by precedence.
        assert_eq!(
            classify("add bread to my order"),
            Intent::Add {
                quantity: 1,
                item: "bread to my order".into()
            }
        );
        assert_eq!(
            classify("order 2 bread"),
            Intent::Add {
                quantity: 2,
                item: "bread".into()
            }
        );
    }

    #[test]
    fn bare_order_trigger_falls_through_to_place_order() {
        assert_eq!(classify("place my order"), Intent::PlaceOrder);
        assert_eq!(classify("confirm order"), Intent::PlaceOrder);
        assert_eq!(classify("checkout"), Intent::PlaceOrder);
        assert_eq!(classify("Check out, that's all!"), Intent::PlaceOrder);
    }

    #[test]
    fn recipe_request_beats_add() {
        assert_eq!(
            classify("add ingredients for pasta for two"),
            Intent::RecipeRequest {
                dish: "pasta for two".into()
            }
        );
        assert_eq!(
            classify("what do I need for masala chai"),
            Intent::RecipeRequest {
                dish: "masala chai".into()
            }
        );
    }

    #[test]
    fn remove_extracts_item() {
        assert_eq!(
            classify("remove the bread from my cart"),
            Intent::Remove {
                item: "bread".into()
            }
        );
        assert_eq!(
            classify("take out milk"),
            Intent::Remove {
                item: "milk".into()
            }
        );
    }

    #[test]
    fn update_requires_an_integer() {
        assert_eq!(
            classify("change bread to 3"),
            Intent::Update {
                item: "bread".into(),
                quantity: 3
            }
        );
        assert_eq!(
            classify("update quantity of milk to 2"),
            Intent::Update {
                item: "milk".into(),
                quantity: 2
            }
        );
        // No integer: the rule does not fire.
        assert_eq!(classify("change everything"), Intent::Unknown);
    }

    #[test]
    fn update_to_zero_is_preserved() {
        assert_eq!(
            classify("set bread to 0"),
            Intent::Update {
                item: "bread".into(),
                quantity: 0
            }
        );
    }

    #[test]
    fn show_cart_variants() {
        assert_eq!(classify("show my cart"), Intent::ShowCart);
        assert_eq!(classify("what's in the basket?"), Intent::ShowCart);
    }

    #[test]
    fn browse_variants() {
        assert_eq!(classify("what do you have"), Intent::Browse);
        assert_eq!(classify("show me the menu"), Intent::Browse);
    }

    #[test]
    fn unknown_is_the_fallback() {
        assert_eq!(classify(""), Intent::Unknown);
        assert_eq!(classify("   "), Intent::Unknown);
        assert_eq!(classify("quack quack"), Intent::Unknown);
    }

    #[test]
    fn trigger_requires_token_boundary() {
        // "saddle" must not fire the "add" rule.
        assert_eq!(classify("my saddle is broken"), Intent::Unknown);
    }
}
