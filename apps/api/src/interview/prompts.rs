// Question-Set Generator prompt templates.

pub const QUESTION_SET_SYSTEM: &str = "\
You are an experienced technical interviewer preparing a screening interview. \
You MUST respond with valid JSON only. No markdown fences, no explanations.";

pub const QUESTION_SET_PROMPT: &str = r#"Read the candidate resume text and generate interview questions strictly grounded in that text.
Return ONLY a JSON object with keys: general, technical, project, experience.
Rules:
- Do NOT include topics not present or clearly implied by the resume.
- If information is missing, ask clarifying questions tied to the resume content (not generic).
- general: {general_count} concise warm-up questions referencing resume content.
- technical: {technical_count} tailored questions (concept + practical), matching the stack/skills in the resume, in increasing difficulty.
- project: {project_count} questions about projects explicitly mentioned in the resume.
- experience: {experience_count} questions about responsibilities, impact, and challenges referenced in the resume.
Output must be valid JSON with arrays of strings for each key.

{grounding_instruction}

Candidate: {name}, {email}, {college}
Resume Text:
{resume_text}"#;
