//! Prompt builders for the matching pipeline

use super::models::{ReadableApplication, ResumeText};
use crate::common::helpers::parse_json_list;
use crate::jobs::models::Job;

pub fn build_compare_prompt(job_description: &str, resumes: &[ResumeText]) -> String {
    let resumes_block = resumes
        .iter()
        .map(|r| format!("Resume File: {}\n{}", r.name, r.content))
        .collect::<Vec<_>>()
        .join("\n---\n");

    format!(
        r#"As an expert recruitment AI, analyze the following job description and resumes.
For each resume, provide a detailed analysis based on the job description.

Respond with ONLY a valid JSON object. Do not include any text before or after the JSON.

The JSON object must have a key "candidate_rankings", which is an array of objects. Each object must contain:
- "full_name": string
- "email": string (as written in the resume, empty if absent)
- "match_percentage": number (0-100)
- "extracted_skills": array of strings (top 5 relevant skills)
- "years_of_experience": number
- "candidate_strengths": string (brief summary)
- "reason_for_match_score": string (brief explanation)
- "id": string (a unique ID)
- "role": string (inferred job role from resume)
- "resumeUrl": string (use the resume file name)
- "keyStrengths": array of strings (2-3 key strengths)
- "aiSuggestions": array of strings (2-3 suggestions for improvement)
- "experience": string (brief experience summary)

Job Description:
---
{}
---

Resumes:
---
{}
---"#,
        job_description, resumes_block
    )
}

/// Asks for the three strongest applicants. Each applicant is identified by
/// its candidate id, or by the application id for sourced resumes.
pub fn build_top_candidates_prompt(job: &Job, applicants: &[ReadableApplication]) -> String {
    let requirements = parse_json_list(job.requirements.as_deref()).join(", ");

    let applicants_block = applicants
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "CANDIDATE {} (ID: {}):\nName: {}\nEmail: {}\nResume Content: {}",
                i + 1,
                a.candidate_ref,
                a.candidate_name,
                a.candidate_email,
                a.resume_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n");

    format!(
        r#"Analyze the following resumes and rank the top 3 candidates for the position of "{}".

JOB DESCRIPTION:
---
{}
Requirements: {}
---

CANDIDATE RESUMES:
---
{}
---

Based on the job description, analyze each candidate's skills, experience, and qualifications.
Respond with ONLY a valid JSON object with a key "top_candidates" holding an array of the top 3 candidates. Each object in the array must have the following keys:
- "candidateId": The ID of the candidate.
- "name": The name of the candidate.
- "email": The email of the candidate.
- "matchScore": An integer from 0 to 100 representing the candidate's match to the job.
- "summary": A brief, one-sentence summary explaining why they are a good match.
- "skills": An array of the candidate's top 5 skills relevant to the job.
- "keyStrengths": An array of 2-3 key strengths or qualifications.
- "aiSuggestions": An array of 2-3 suggested interview questions or points to discuss."#,
        job.title, job.description, requirements, applicants_block
    )
}

pub fn build_validation_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following text to determine if it is a professional resume.
Respond with ONLY a valid JSON object with two keys:
1. "is_resume": a boolean (true if it's a resume, false otherwise).
2. "reason": a brief, one-sentence explanation for your decision.

Text to analyze:
---
{}
---"#,
        text
    )
}
