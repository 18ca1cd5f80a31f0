//! One sorting run.
//!
//! A [`SortSession`] owns the rules, the address cache and the executor
//! for a run and processes messages strictly one at a time. Nothing that
//! happens to a single message can abort the run.

use tracing::{debug, error, info, warn};

use crate::cache::{AddressResolutionCache, CacheStore, DirectoryResolver};
use crate::classifier::{RuleMatch, classify};
use crate::config::SorterConfig;
use crate::error::{ClassificationError, RuleLoadError};
use crate::rules::{RuleSource, RuleStore};
use crate::service::{ActionExecutor, DELETE_DESTINATION, MailMessage, Mailbox};

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Moved into the named destination.
    Moved(String),
    /// Deleted.
    Deleted,
    /// No rule applied; the message was left alone.
    Unmatched,
    /// Evaluation or the action failed; the message was left alone.
    Failed,
}

/// Tally of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Messages looked at.
    pub processed: usize,
    /// Messages moved.
    pub moved: usize,
    /// Messages deleted.
    pub deleted: usize,
    /// Messages no rule applied to.
    pub unmatched: usize,
    /// Messages that could not be evaluated or acted on.
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &MessageOutcome) {
        self.processed += 1;
        match outcome {
            MessageOutcome::Moved(_) => self.moved += 1,
            MessageOutcome::Deleted => self.deleted += 1,
            MessageOutcome::Unmatched => self.unmatched += 1,
            MessageOutcome::Failed => self.failed += 1,
        }
    }
}

/// State for one sorting run.
pub struct SortSession<S, R> {
    rules: RuleStore,
    cache: AddressResolutionCache<S>,
    resolver: R,
    executor: ActionExecutor,
}

impl<S: CacheStore, R: DirectoryResolver> SortSession<S, R> {
    /// Assemble a session from already loaded parts.
    pub fn new(rules: RuleStore, cache: AddressResolutionCache<S>, resolver: R) -> Self {
        Self {
            rules,
            cache,
            resolver,
            executor: ActionExecutor::new(),
        }
    }

    /// Load rules from `source` and the cache from `store`.
    ///
    /// Skipped rule rows are returned next to the session.
    ///
    /// # Errors
    ///
    /// Returns [`RuleLoadError::SourceUnavailable`] if the rule source cannot be read.
    pub async fn start<Src: RuleSource>(
        config: &SorterConfig,
        source: &Src,
        store: S,
        resolver: R,
    ) -> Result<(Self, Vec<RuleLoadError>), RuleLoadError> {
        let load = RuleStore::load(source).await?;
        let cache = AddressResolutionCache::load(store, config.cache_save_interval).await;
        Ok((Self::new(load.rules, cache, resolver), load.skipped))
    }

    /// Sender address to match rules against.
    ///
    /// Internal senders are mapped through the cache; when that yields
    /// nothing the raw sender address is used. An unreadable sender is
    /// treated as empty.
    pub async fn resolve_sender<Msg: MailMessage>(&mut self, message: &Msg) -> String {
        if let Some(internal) = message.internal_sender() {
            if let Some(canonical) = self.cache.resolve(&self.resolver, &internal).await {
                return canonical;
            }
        }

        match message.sender_address() {
            Ok(address) => address,
            Err(e) => {
                debug!(error = %e, "Sender unavailable, treating as empty");
                String::new()
            }
        }
    }

    /// Find the rule that applies to `message`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassificationError`] if the subject or body cannot be read.
    pub async fn evaluate<Msg: MailMessage>(
        &mut self,
        message: &Msg,
    ) -> Result<Option<RuleMatch>, ClassificationError> {
        let subject = message.subject()?;
        let body = message.body()?;
        let sender = self.resolve_sender(message).await;

        Ok(classify(&self.rules, &sender, &subject, &body))
    }

    /// Classify `message` and apply the matching action.
    pub async fn process_message<M: Mailbox>(
        &mut self,
        mailbox: &M,
        message: &M::Message,
        root: &M::Folder,
    ) -> MessageOutcome {
        let rule = match self.evaluate(message).await {
            Ok(Some(rule)) => rule,
            Ok(None) => return MessageOutcome::Unmatched,
            Err(e) => {
                warn!(error = %e, "Skipping message");
                return MessageOutcome::Failed;
            }
        };

        if !self.executor.execute(mailbox, message, root, &rule).await {
            return MessageOutcome::Failed;
        }

        if rule.destination == DELETE_DESTINATION {
            MessageOutcome::Deleted
        } else {
            MessageOutcome::Moved(rule.destination)
        }
    }

    /// Process `messages` in order.
    pub async fn sort_messages<'a, M, I>(
        &mut self,
        mailbox: &M,
        messages: I,
        root: &M::Folder,
    ) -> RunSummary
    where
        M: Mailbox,
        M::Message: 'a,
        I: IntoIterator<Item = &'a M::Message>,
    {
        let mut summary = RunSummary::default();

        for message in messages {
            let outcome = self.process_message(mailbox, message, root).await;
            summary.record(&outcome);
        }

        info!(
            processed = summary.processed,
            moved = summary.moved,
            deleted = summary.deleted,
            unmatched = summary.unmatched,
            failed = summary.failed,
            "Run complete"
        );
        summary
    }

    /// Flush the address cache at the end of a run.
    ///
    /// Returns `true` if the cache was persisted.
    pub async fn finish(&mut self) -> bool {
        let saved = self.cache.flush().await;
        if !saved {
            error!("Address cache not saved at end of run");
        }
        saved
    }

    /// Loaded rules.
    #[must_use]
    pub const fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Address cache.
    #[must_use]
    pub const fn cache(&self) -> &AddressResolutionCache<S> {
        &self.cache
    }

    /// Action executor and its journal.
    #[must_use]
    pub const fn executor(&self) -> &ActionExecutor {
        &self.executor
    }
}
