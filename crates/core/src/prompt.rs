//! Prompt assembly for the content generator.
//!
//! The whole deck input, the theme front-matter and the slide structure are
//! folded into one text prompt. The generator is expected to answer with
//! Marp markdown only.

use std::fmt::Write;

use crate::deck::{PitchDeckData, TeamMember};
use crate::themes::{palette_for, Palette};

/// Logo reference used when the client supplied none.
pub const DEFAULT_LOGO_PATH: &str = "./logo.png";

/// Image references as they should appear in the generated markup
/// (paths relative to the job directory, or URLs passed through).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckImages {
    pub logo: Option<String>,
    pub team_photo: Option<String>,
    pub diagram: Option<String>,
}

const SLIDE_STRUCTURE: &str = "\
2. Create 10-13 slides following this structure:
   - Problem & Market Need (emphasize pain points and market size)
   - Solution & Value Proposition (highlight unique selling points)
   - Market Opportunity (visualize with TAM, SAM, SOM funnel){diagram}
   - Competitive Landscape (position your solution)
   - Product/Technology Overview (emphasize differentiators)
   - Business Model & Go-to-Market Strategy
   - Team & Expertise (showcase qualifications){team}
   - Traction & Milestones (past achievements and future roadmap)
   - Funding Ask & Use of Funds
   - Call to Action & Contact Information
";

const GUIDELINES: &str = "\
**IMPORTANT GUIDELINES:**

1. Always begin with a short title slide with a title, a brief description, and the author's name (if provided, use CEO). The title should be an H1 header, the description should be regular text, and the author's name should be regular text.
2. Ensure that the content on each slide fits inside the slide. Never create paragraphs.
3. Always use bullet points and other formatting options to make the content more readable. (don't use fragment)
4. Prefer multi-line code blocks over inline code blocks for any code longer than a few words.
5. Do not end with --- (three dashes) on a new line, as this will end the presentation with an empty slide.
6. Use bold (**text**) for emphasis and italics (*text*) for secondary emphasis.
7. Create visual hierarchies with indentation and spacing.
8. Use tables for structured data comparisons (market analysis, competitive landscape).
9. Use blockquotes (> text) for customer testimonials or important statements.
10. Answer with the Marp markdown document only.
";

/// Render team members as `Name (Role): Experience`, one per line.
pub fn format_team_members(members: &[TeamMember]) -> String {
    members
        .iter()
        .map(|m| format!("{} ({}): {}", m.name, m.role, m.experience))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the generation prompt for a (normalized) deck input.
pub fn build_prompt(data: &PitchDeckData, images: &DeckImages) -> String {
    let palette = palette_for(
        &data.theme,
        data.background_color.as_deref(),
        data.text_color.as_deref(),
    );
    let logo = images.logo.as_deref().unwrap_or(DEFAULT_LOGO_PATH);

    let mut out = String::with_capacity(4096);
    out.push_str(
        "You are an expert presentation designer specializing in Marp markdown presentations. \
         Create a professional pitch deck using the following information:\n\n",
    );
    write_overview(&mut out, data);
    out.push_str("\n**PRESENTATION REQUIREMENTS:**\n\n");
    write_front_matter(&mut out, &data.theme, &palette, logo);

    let diagram = images
        .diagram
        .as_deref()
        .map(|p| format!(", ![w:400]({p})"))
        .unwrap_or_default();
    let team = images
        .team_photo
        .as_deref()
        .map(|p| format!(", ![w:60]({p})"))
        .unwrap_or_default();
    out.push('\n');
    out.push_str(
        &SLIDE_STRUCTURE
            .replace("{diagram}", &diagram)
            .replace("{team}", &team),
    );
    out.push('\n');
    out.push_str(GUIDELINES);
    out
}

fn write_overview(out: &mut String, d: &PitchDeckData) {
    let team = format_team_members(&d.team_members);
    let sections: [(&str, Vec<(&str, &str)>); 7] = [
        (
            "Project Information",
            vec![
                ("Project Name", d.project_name.as_str()),
                ("Big Idea", d.big_idea.as_str()),
            ],
        ),
        (
            "Market Analysis",
            vec![
                ("Problem", d.problem.as_str()),
                ("Target Audience", d.target_audience.as_str()),
                ("Existing Solutions", d.existing_solutions.as_str()),
            ],
        ),
        (
            "Solution Details",
            vec![
                ("Solution", d.solution.as_str()),
                ("Technology", d.technology.as_str()),
                ("Differentiators", d.differentiators.as_str()),
                ("Development Plan", d.development_plan.as_str()),
                ("Market Size", d.market_size.as_str()),
            ],
        ),
        (
            "Investment Information",
            vec![
                ("Funding Amount", d.funding_amount.as_str()),
                ("Funding Use", d.funding_use.as_str()),
                ("Valuation", d.valuation.as_str()),
                ("Investment Structure", d.investment_structure.as_str()),
            ],
        ),
        (
            "Market Opportunity",
            vec![
                ("TAM", d.tam.as_str()),
                ("SAM", d.sam.as_str()),
                ("SOM", d.som.as_str()),
                ("Target Niche", d.target_niche.as_str()),
                ("Market Trends", d.market_trends.as_str()),
                ("Industry", d.industry.as_str()),
            ],
        ),
        (
            "Team Information",
            vec![
                ("Why You", d.why_you.as_str()),
                ("Team Members", team.as_str()),
                ("Team Qualification", d.team_qualification.as_str()),
            ],
        ),
        (
            "Contact Information",
            vec![
                ("Email", d.contact_info.email.as_str()),
                ("LinkedIn", d.contact_info.linkedin.as_str()),
                ("Other Socials", d.contact_info.socials.as_str()),
                ("Key Takeaways", d.key_takeaways.as_str()),
            ],
        ),
    ];

    out.push_str("**PROJECT OVERVIEW**\n\n");
    for (title, fields) in sections {
        let _ = writeln!(out, "- **{title}**");
        for (label, value) in fields {
            let _ = writeln!(out, "  - {label}: {value}");
        }
        out.push('\n');
    }
}

fn write_front_matter(out: &mut String, theme: &str, palette: &Palette, logo: &str) {
    let _ = write!(
        out,
        "1. Use this Marp structure and place the logo in the top right corner of each slide:\n\
         ---\n\
         marp: true\n\
         theme: {theme}\n\
         paginate: true\n\
         backgroundColor: {bg}\n\
         color: {fg}\n\
         ---\n\
         \n\
         <style>\n  \
           section {{ position: relative; }}\n  \
           .top-right-logo {{ position: absolute; top: 20px; right: 20px; width: 80px; z-index: 1000; }}\n\
         </style>\n\
         \n\
         <div class=\"top-right-logo\">\n  \
           <img src=\"{logo}\" alt=\"Logo\" width=\"80\">\n\
         </div>\n",
        bg = palette.background,
        fg = palette.text,
    );
}
