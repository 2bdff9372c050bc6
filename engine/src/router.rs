use color_eyre::Result;
use indoc::indoc;
use log::{debug, warn};
use serde::Deserialize;
use strum::{Display, EnumString};

use crate::llm::{InputMessage, LLM, Request};

/// Reasoning substituted when the decision reply cannot be parsed.
pub const FALLBACK_REASONING: &str = "Default to search";

#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
pub enum Tool {
    #[strum(serialize = "generate_image")]
    GenerateImage,
    #[strum(serialize = "web_browsing")]
    WebBrowsing,
    /// Anything else the model names. Carried along for display, rejected at
    /// dispatch.
    #[strum(default)]
    Unrecognized(String),
}

/// The routing record: which tool handles the request, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub tool: Tool,
    pub reasoning: String,
}

impl Decision {
    fn fallback() -> Self {
        Self {
            tool: Tool::WebBrowsing,
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }
}

/// Asks the classification model to pick a tool for `user_input`.
///
/// Transport errors propagate; a reply that is not the mandated JSON object
/// degrades to the web-search fallback instead of failing.
pub async fn route(llm: &mut dyn LLM, user_input: &str) -> Result<Decision> {
    let req = Request {
        system: Some(system_instruction().to_string()),
        messages: vec![InputMessage::user(format!(
            "Decide the best tool for this task: {user_input}. \
             Output ONLY the JSON with 'reasoning' and 'tool' fields, nothing else."
        ))],
    };

    let output = llm.send_request(req).await?;
    debug!("decision reply:\n{}", output.text);
    Ok(parse_decision(&output.text))
}

fn system_instruction() -> &'static str {
    indoc! {r#"
        You are a decision-making agent. Analyze the user's input and decide whether
        to use the "generate_image" tool or the "web_browsing" tool.
        Output your decision in JSON format with 'reasoning' and 'tool' fields.
        The JSON should start and end with curly brackets, with no additional text.
        Example format:
        {
          "reasoning": "Thorough explanation for the decision...",
          "tool": "generate_image" or "web_browsing"
        }
        Do NOT output any text other than the JSON.
    "#}
}

/// Strict parse of the model's reply. Any deviation from a single
/// `{reasoning, tool}` object yields the fallback decision, never an error.
pub fn parse_decision(text: &str) -> Decision {
    match serde_json::from_str::<DecisionWire>(text) {
        Ok(DecisionWire { reasoning, tool }) => {
            let tool = match tool.parse() {
                Ok(tool) => tool,
                // the catch-all variant makes this unreachable
                Err(_) => Tool::Unrecognized(tool),
            };
            Decision { tool, reasoning }
        }
        Err(err) => {
            warn!("unparsable decision reply ({err}), falling back to web search");
            Decision::fallback()
        }
    }
}

//
// ===== decision wire format =====
//

#[derive(Debug, Deserialize)]
struct DecisionWire {
    reasoning: String,
    tool: String,
}

#[cfg(test)]
mod tests {
    use color_eyre::eyre::eyre;

    use super::*;
    use crate::llm::{LLMFuture, OutputMessage};

    struct CannedLLM {
        reply: String,
    }

    impl LLM for CannedLLM {
        fn send_request(&mut self, _req: Request) -> LLMFuture<'_> {
            let reply = self.reply.clone();
            Box::pin(async move {
                Ok(OutputMessage {
                    input_tokens: 0,
                    output_tokens: 0,
                    text: reply,
                })
            })
        }
    }

    struct BrokenLLM;

    impl LLM for BrokenLLM {
        fn send_request(&mut self, _req: Request) -> LLMFuture<'_> {
            Box::pin(async { Err(eyre!("connection reset")) })
        }
    }

    #[test]
    fn parses_image_decision() {
        let decision =
            parse_decision(r#"{"reasoning": "The user wants artwork.", "tool": "generate_image"}"#);

        assert_eq!(
            decision,
            Decision {
                tool: Tool::GenerateImage,
                reasoning: "The user wants artwork.".to_string(),
            }
        );
    }

    #[test]
    fn parses_search_decision() {
        let decision =
            parse_decision(r#"{"reasoning": "Needs fresh data.", "tool": "web_browsing"}"#);

        assert_eq!(decision.tool, Tool::WebBrowsing);
        assert_eq!(decision.reasoning, "Needs fresh data.");
    }

    #[test]
    fn malformed_reply_falls_back_to_search() {
        let decision = parse_decision("Sure! Here is my decision: generate_image");

        assert_eq!(
            decision,
            Decision {
                tool: Tool::WebBrowsing,
                reasoning: FALLBACK_REASONING.to_string(),
            }
        );
    }

    #[test]
    fn missing_field_falls_back_to_search() {
        let decision = parse_decision(r#"{"tool": "generate_image"}"#);

        assert_eq!(decision, Decision::fallback());
    }

    #[test]
    fn surrounding_text_falls_back_to_search() {
        let decision =
            parse_decision(r#"{"reasoning": "ok", "tool": "generate_image"} trailing words"#);

        assert_eq!(decision, Decision::fallback());
    }

    #[test]
    fn unknown_tool_is_preserved_as_unrecognized() {
        let decision =
            parse_decision(r#"{"reasoning": "hmm", "tool": "delete_everything"}"#);

        assert_eq!(
            decision.tool,
            Tool::Unrecognized("delete_everything".to_string())
        );
        assert_eq!(decision.reasoning, "hmm");
    }

    #[test]
    fn tool_display_matches_wire_names() {
        assert_eq!(Tool::GenerateImage.to_string(), "generate_image");
        assert_eq!(Tool::WebBrowsing.to_string(), "web_browsing");
        assert_eq!(
            Tool::Unrecognized("delete_everything".to_string()).to_string(),
            "delete_everything"
        );
    }

    #[test]
    fn instruction_names_both_tools() {
        let instruction = system_instruction();

        assert!(instruction.contains("\"generate_image\""));
        assert!(instruction.contains("\"web_browsing\""));
        assert!(instruction.contains("'reasoning' and 'tool'"));
    }

    #[tokio::test]
    async fn route_parses_model_reply() -> Result<()> {
        let mut llm = CannedLLM {
            reply: r#"{"reasoning": "Wants a picture.", "tool": "generate_image"}"#.to_string(),
        };

        let decision = route(&mut llm, "a poster for a jazz concert").await?;
        assert_eq!(decision.tool, Tool::GenerateImage);
        Ok(())
    }

    #[tokio::test]
    async fn route_absorbs_garbage_replies() -> Result<()> {
        let mut llm = CannedLLM {
            reply: "I think you should browse the web".to_string(),
        };

        let decision = route(&mut llm, "current weather in Tokyo").await?;
        assert_eq!(decision, Decision::fallback());
        Ok(())
    }

    #[tokio::test]
    async fn route_propagates_transport_errors() {
        let err = route(&mut BrokenLLM, "anything").await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
