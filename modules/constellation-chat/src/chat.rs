//! The analyst: retrieval-grounded question answering over a constellation.
//!
//! Flow per question:
//! 1. Embed the question in the article vector space
//! 2. Rank articles against it and keep the winners
//! 3. Serialize the winners into a grounding context block
//! 4. Send system prompt + recent history + context + question to the generator
//!
//! Empty question, empty constellation and zero retrieval hits are sentinel
//! outcomes with canned replies; the generator is never called for them.

use std::sync::Arc;

use tracing::{debug, info};

use ai_client::traits::{ChatAgent, Message};
use constellation_common::{ConstellationError, TextEmbedder};
use constellation_graph::Constellation;

use crate::context::format_context;
use crate::memory::{documents_from_articles, MemoryHit, MemoryStore};
use crate::retriever::{retrieve, RankedArticle, RetrievalSettings};

/// How many of the most recent conversation turns accompany each question.
/// Older turns are dropped; the article context matters more than deep
/// conversational state.
pub const HISTORY_WINDOW: usize = 6;

const SYSTEM_PROMPT: &str = "You are a news analyst. You answer questions using only the \
    article context provided with each question. Be direct and specific, cite articles by \
    number, and say plainly when the articles do not cover something.";

/// One prior exchange in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// The analyst's reply plus the retrieval evidence behind it. `context_used`
/// is false for sentinel replies that never reached the generator.
#[derive(Debug)]
pub struct ChatOutcome {
    pub response: String,
    pub sources: Vec<RankedArticle>,
    pub context_used: bool,
}

impl ChatOutcome {
    fn sentinel(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            sources: Vec::new(),
            context_used: false,
        }
    }
}

/// Optional long-term memory bound to a namespace.
pub struct MemoryBinding {
    pub store: Arc<dyn MemoryStore>,
    pub namespace: String,
}

/// Session-scoped analyst over one constellation. The embedder must be the
/// same one that embedded the articles.
pub struct Analyst {
    embedder: Arc<dyn TextEmbedder>,
    generator: Arc<dyn ChatAgent>,
    memory: Option<MemoryBinding>,
    settings: RetrievalSettings,
}

impl Analyst {
    pub fn new(embedder: Arc<dyn TextEmbedder>, generator: Arc<dyn ChatAgent>) -> Self {
        Self {
            embedder,
            generator,
            memory: None,
            settings: RetrievalSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RetrievalSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_memory(mut self, store: Arc<dyn MemoryStore>, namespace: &str) -> Self {
        self.memory = Some(MemoryBinding {
            store,
            namespace: namespace.to_string(),
        });
        self
    }

    /// Answer a question against the constellation, grounded in retrieved
    /// articles. `history` is the prior conversation, oldest first.
    pub async fn answer(
        &self,
        constellation: &Constellation,
        history: &[ChatTurn],
        question: &str,
    ) -> Result<ChatOutcome, ConstellationError> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(ChatOutcome::sentinel(
                "Ask a question about the loaded articles to get started.",
            ));
        }
        if constellation.is_empty() {
            return Ok(ChatOutcome::sentinel(
                "No articles are loaded in this session, so there is nothing to answer from.",
            ));
        }

        let query_vector = self
            .embedder
            .embed(question)
            .await
            .map_err(|e| ConstellationError::Embedding(e.to_string()))?;

        let sources = retrieve(&query_vector, &constellation.articles, &self.settings);
        if sources.is_empty() {
            debug!(min_score = self.settings.min_score, "No retrieval hits");
            return Ok(ChatOutcome::sentinel(format!(
                "None of the loaded articles matched that question (similarity \
                 threshold {:.2}). Try rephrasing, or ask about what the articles cover.",
                self.settings.min_score
            )));
        }

        let context = format_context(&sources, constellation);

        let mut messages = vec![Message::system(SYSTEM_PROMPT)];
        let recent = history.len().saturating_sub(HISTORY_WINDOW);
        for turn in &history[recent..] {
            messages.push(match turn.role {
                TurnRole::User => Message::user(&turn.content),
                TurnRole::Assistant => Message::assistant(&turn.content),
            });
        }
        messages.push(Message::user(format!("{context}\n\nQuestion: {question}")));

        let response = self
            .generator
            .chat(messages)
            .await
            .map_err(|e| ConstellationError::Generation(e.to_string()))?;

        info!(hits = sources.len(), "Answered from article context");
        Ok(ChatOutcome {
            response,
            sources,
            context_used: true,
        })
    }

    /// Persist the session's articles into long-term memory. No-op without a
    /// memory binding.
    pub async fn memorize(
        &self,
        constellation: &Constellation,
    ) -> Result<usize, ConstellationError> {
        let Some(binding) = &self.memory else {
            return Ok(0);
        };
        let documents = documents_from_articles(&binding.namespace, &constellation.articles);
        let count = documents.len();
        binding
            .store
            .upsert(&binding.namespace, documents)
            .await
            .map_err(|e| ConstellationError::MemoryStore(e.to_string()))?;
        Ok(count)
    }

    /// Recall remembered articles matching a query. Empty without a memory
    /// binding.
    pub async fn recall(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<MemoryHit>, ConstellationError> {
        let Some(binding) = &self.memory else {
            return Ok(Vec::new());
        };
        binding
            .store
            .search(&binding.namespace, query, top_k)
            .await
            .map_err(|e| ConstellationError::MemoryStore(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CannedChatAgent, FixedEmbedder, MockMemoryStore};
    use constellation_common::Article;
    use constellation_graph::GraphSettings;

    fn article(title: &str, text: &str) -> Article {
        Article {
            title: title.to_string(),
            text: text.to_string(),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            image_url: None,
            published_at: None,
        }
    }

    async fn ai_pizza_constellation(embedder: &FixedEmbedder) -> Constellation {
        let articles = vec![
            article("GPU demand spikes", "AI demand drives GPU hardware boom"),
            article("AI hardware race", "Training clusters strain GPU supply"),
            article("Perfect pizza dough", "Flour, water, salt, yeast"),
        ];
        Constellation::build(embedder, articles, &GraphSettings::default())
            .await
            .unwrap()
    }

    fn registered_embedder() -> FixedEmbedder {
        FixedEmbedder::new(3)
            .on_text(
                "GPU demand spikes: AI demand drives GPU hardware boom",
                vec![1.0, 0.1, 0.0],
            )
            .on_text(
                "AI hardware race: Training clusters strain GPU supply",
                vec![0.9, 0.3, 0.05],
            )
            .on_text(
                "Perfect pizza dough: Flour, water, salt, yeast",
                vec![0.0, 0.05, 1.0],
            )
            .on_text("What is happening with GPUs?", vec![1.0, 0.2, 0.0])
            .on_text("How do I make pizza?", vec![0.0, 0.1, 1.0])
    }

    #[tokio::test]
    async fn empty_question_is_a_sentinel() {
        let embedder = Arc::new(registered_embedder());
        let generator = Arc::new(CannedChatAgent::replying("unused"));
        let constellation = ai_pizza_constellation(&embedder).await;

        let analyst = Analyst::new(embedder, generator.clone());
        let outcome = analyst.answer(&constellation, &[], "   ").await.unwrap();

        assert!(!outcome.context_used);
        assert!(outcome.sources.is_empty());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn empty_constellation_is_a_sentinel() {
        let embedder = Arc::new(registered_embedder());
        let generator = Arc::new(CannedChatAgent::replying("unused"));

        let analyst = Analyst::new(embedder, generator.clone());
        let outcome = analyst
            .answer(&Constellation::default(), &[], "What is happening?")
            .await
            .unwrap();

        assert!(!outcome.context_used);
        assert!(outcome.response.contains("No articles"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn no_hits_reply_names_the_threshold() {
        let embedder = Arc::new(registered_embedder().on_text("off topic", vec![0.0, 1.0, 0.0]));
        let generator = Arc::new(CannedChatAgent::replying("unused"));
        let constellation = ai_pizza_constellation(&embedder).await;

        let analyst = Analyst::new(embedder, generator.clone()).with_settings(RetrievalSettings {
            min_score: 0.95,
            ..RetrievalSettings::default()
        });
        let outcome = analyst
            .answer(&constellation, &[], "off topic")
            .await
            .unwrap();

        assert!(!outcome.context_used);
        assert!(outcome.response.contains("0.95"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn answers_carry_sources_and_grounded_context() {
        let embedder = Arc::new(registered_embedder());
        let generator = Arc::new(CannedChatAgent::replying("GPUs are in short supply."));
        let constellation = ai_pizza_constellation(&embedder).await;

        let analyst = Analyst::new(embedder, generator.clone());
        let outcome = analyst
            .answer(&constellation, &[], "What is happening with GPUs?")
            .await
            .unwrap();

        assert!(outcome.context_used);
        assert_eq!(outcome.response, "GPUs are in short supply.");
        // Both AI articles retrieved, best match first; pizza excluded.
        assert_eq!(outcome.sources[0].index, 0);
        assert!(outcome.sources.iter().all(|s| s.index != 2));

        // The generator saw system prompt + one user message with the context.
        let messages = generator.last_messages();
        assert_eq!(messages.len(), 2);
        let prompt = &messages[1].content;
        assert!(prompt.contains("GPU demand spikes"));
        assert!(prompt.contains("Question: What is happening with GPUs?"));
        assert!(!prompt.contains("pizza dough"));
    }

    #[tokio::test]
    async fn history_is_windowed_to_recent_turns() {
        let embedder = Arc::new(registered_embedder());
        let generator = Arc::new(CannedChatAgent::replying("ok"));
        let constellation = ai_pizza_constellation(&embedder).await;

        let history: Vec<ChatTurn> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::user(format!("question {i}"))
                } else {
                    ChatTurn::assistant(format!("answer {i}"))
                }
            })
            .collect();

        let analyst = Analyst::new(embedder, generator.clone());
        analyst
            .answer(&constellation, &history, "What is happening with GPUs?")
            .await
            .unwrap();

        // system + 6 history turns + final user message
        let messages = generator.last_messages();
        assert_eq!(messages.len(), 1 + HISTORY_WINDOW + 1);
        assert!(messages[1].content.contains("question 4"));
        assert!(!messages.iter().any(|m| m.content.contains("question 2")));
    }

    #[tokio::test]
    async fn generation_failure_maps_to_generation_error() {
        let embedder = Arc::new(registered_embedder());
        let generator = Arc::new(CannedChatAgent::failing("backend down"));
        let constellation = ai_pizza_constellation(&embedder).await;

        let analyst = Analyst::new(embedder, generator);
        let result = analyst
            .answer(&constellation, &[], "What is happening with GPUs?")
            .await;

        match result {
            Err(ConstellationError::Generation(msg)) => assert!(msg.contains("backend down")),
            other => panic!("expected generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn memorize_upserts_one_document_per_article() {
        let embedder = Arc::new(registered_embedder());
        let generator = Arc::new(CannedChatAgent::replying("ok"));
        let memory = Arc::new(MockMemoryStore::new());
        let constellation = ai_pizza_constellation(&embedder).await;

        let analyst =
            Analyst::new(embedder, generator).with_memory(memory.clone(), "session-1");
        let count = analyst.memorize(&constellation).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(memory.document_count("session-1"), 3);
    }

    #[tokio::test]
    async fn memory_is_optional() {
        let embedder = Arc::new(registered_embedder());
        let generator = Arc::new(CannedChatAgent::replying("ok"));
        let constellation = ai_pizza_constellation(&embedder).await;

        let analyst = Analyst::new(embedder, generator);
        assert_eq!(analyst.memorize(&constellation).await.unwrap(), 0);
        assert!(analyst.recall("anything", 5).await.unwrap().is_empty());
    }
}
