use std::ops::{Add, AddAssign};

/// Token consumption reported with every `response.done`.
///
/// Counters only ever grow: reports are summed field by field, see
/// [`TokenUsage::merge`]. Nested breakdowns the provider leaves out count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_token_details: InputTokenDetails,
    pub output_token_details: OutputTokenDetails,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InputTokenDetails {
    pub cached_tokens: u64,
    pub text_tokens: u64,
    pub audio_tokens: u64,
    pub cached_tokens_details: CachedTokenDetails,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CachedTokenDetails {
    pub text_tokens: u64,
    pub audio_tokens: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputTokenDetails {
    pub text_tokens: u64,
    pub audio_tokens: u64,
}

impl TokenUsage {
    /// Adds `other` into `self`, field by field. Counters saturate at `u64::MAX`.
    pub fn merge(&mut self, other: &TokenUsage) {
        fn add(counter: &mut u64, report: u64) {
            *counter = counter.saturating_add(report);
        }

        add(&mut self.total_tokens, other.total_tokens);
        add(&mut self.input_tokens, other.input_tokens);
        add(&mut self.output_tokens, other.output_tokens);

        let input = &mut self.input_token_details;
        let reported = &other.input_token_details;
        add(&mut input.cached_tokens, reported.cached_tokens);
        add(&mut input.text_tokens, reported.text_tokens);
        add(&mut input.audio_tokens, reported.audio_tokens);
        add(
            &mut input.cached_tokens_details.text_tokens,
            reported.cached_tokens_details.text_tokens,
        );
        add(
            &mut input.cached_tokens_details.audio_tokens,
            reported.cached_tokens_details.audio_tokens,
        );

        let output = &mut self.output_token_details;
        add(&mut output.text_tokens, other.output_token_details.text_tokens);
        add(&mut output.audio_tokens, other.output_token_details.audio_tokens);
    }
}

impl AddAssign<&TokenUsage> for TokenUsage {
    fn add_assign(&mut self, rhs: &TokenUsage) {
        self.merge(rhs);
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(mut self, rhs: TokenUsage) -> TokenUsage {
        self.merge(&rhs);
        self
    }
}
