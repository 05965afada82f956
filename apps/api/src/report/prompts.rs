// Report Synthesizer prompt templates.

pub const REPORT_SYSTEM: &str = "\
You are a senior hiring manager writing a concise screening report. \
You MUST respond with valid JSON only. No markdown fences, no explanations.";

pub const REPORT_PROMPT: &str = r#"Based on the candidate's resume and their answers to the screening questions, generate a concise hiring report.
The report must be a JSON object with the following keys:
- "overall_score": An integer from 0 to 100.
- "strengths": A list of strings highlighting key strengths.
- "weaknesses": A list of strings highlighting potential weaknesses or risks.
- "recommendation": Exactly one of "Strongly Recommend", "Recommend", "Consider", "Do Not Proceed".
- "summary": A brief paragraph summarizing the candidate's profile and performance.

{grounding_instruction}

Resume Text:
{resume_text}

Interview Q&A:
{transcript}

Now, provide the JSON report."#;
