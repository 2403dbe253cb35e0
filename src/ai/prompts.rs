use crate::domain::Tone;

/// Longest email body the AI endpoints accept, in characters.
pub const MAX_EMAIL_LENGTH: usize = 2000;
/// Longest optional analyzer context, in characters.
pub const MAX_CONTEXT_LENGTH: usize = 3000;

const PROFESSIONAL_PROMPT: &str = r#"Rewrite the following email in a professional, formal business tone.
    - DETECT the language of the input (English or German) and output in the SAME language.
    - Use proper salutations and closings (e.g., "Sincerely" or "Mit freundlichen Grüßen").
    - Maintain clarity and precision.
    - Remove any emotional or aggressive language.
    - Keep the core message intact."#;

const EMPATHETIC_PROMPT: &str = r#"Rewrite the following email in an empathetic, understanding tone.
    - DETECT the language of the input (English or German) and output in the SAME language.
    - Show compassion and understanding.
    - Acknowledge the situation diplomatically.
    - Use warm but professional language.
    - Keep the core message intact."#;

const ASSERTIVE_PROMPT: &str = r#"Rewrite the following email in an assertive but respectful tone.
    - DETECT the language of the input (English or German) and output in the SAME language.
    - Be direct and clear about expectations.
    - Maintain professionalism.
    - Use confident language without being aggressive.
    - Keep the core message intact."#;

pub const ANALYZE_PROMPT: &str = r#"You are a bilingual email analyst (English/German). Analyze the incoming email and provide the following.

CRITICAL: Detect the language of the incoming email. Your output (summary, key points, and response contents) MUST be in that SAME language.

1. A brief summary (2-3 sentences)
2. The overall sentiment (positive, neutral, negative, or urgent)
3. Key points that need to be addressed (as bullet points)
4. TWO different response options with different tones

Respond in the following JSON format ONLY (no markdown, no extra text). Keep JSON keys in English, but values in the detected language:
{
  "summary": "Brief summary here (in input language)",
  "sentiment": "positive|neutral|negative|urgent",
  "keyPoints": ["point 1", "point 2", "point 3"],
  "responseOptions": [
    {
      "id": "1",
      "tone": "Friendly & Accommodating",
      "content": "Full email response here (in input language)..."
    },
    {
      "id": "2",
      "tone": "Professional & Direct",
      "content": "Full email response here (in input language)..."
    }
  ]
}"#;

pub fn tone_prompt(tone: Tone) -> &'static str {
    match tone {
        Tone::Professional => PROFESSIONAL_PROMPT,
        Tone::Empathetic => EMPATHETIC_PROMPT,
        Tone::Assertive => ASSERTIVE_PROMPT,
    }
}
