/// Compile-time search configuration: which terms each collector runs and
/// how many results it keeps. Resolved once at startup and handed to the
/// collectors together with the credentials from `Config`.
pub struct SearchProfile {
    pub forum_terms: Vec<&'static str>,
    /// Top results kept per forum term.
    pub forum_limit: usize,

    pub video_terms: Vec<&'static str>,
    /// Region codes the video term list is run against, one pass each.
    pub video_regions: Vec<&'static str>,
    /// Results kept per video term per region.
    pub video_limit: usize,

    pub codehost_queries: Vec<&'static str>,
    /// Repositories kept per code host query.
    pub codehost_limit: usize,

    pub trend_keywords: Vec<&'static str>,
    /// Region codes interest is sampled for.
    pub trend_regions: Vec<&'static str>,

    pub microblog_queries: Vec<&'static str>,
    /// Posts kept per microblog query.
    pub microblog_limit: usize,
}

/// The workflow-automation profile: popularity of automation workflows and
/// integrations across the tracked platforms.
pub fn default_profile() -> SearchProfile {
    SearchProfile {
        forum_terms: vec![
            "workflow",
            "automation",
            "google sheets",
            "slack",
            "api",
            "webhook",
            "discord",
            "airtable",
            "notion",
            "database",
            "gmail",
            "openai",
            "shopify",
            "telegram",
            "typeform",
            "jira",
            "hubspot",
            "wordpress",
            "rss feed",
            "crm sync",
        ],
        forum_limit: 50,
        video_terms: vec![
            "n8n workflow",
            "n8n automation",
            "n8n tutorial",
            "n8n google sheets",
            "n8n slack",
            "n8n airtable",
            "n8n discord notification",
            "n8n shopify",
            "n8n vs make",
            "n8n typeform",
            "n8n self host",
            "n8n postgres",
        ],
        video_regions: vec!["US", "IN"],
        video_limit: 50,
        codehost_queries: vec!["n8n workflow", "n8n-nodes", "n8n custom", "n8n self-hosted"],
        codehost_limit: 100,
        trend_keywords: vec![
            "n8n",
            "n8n automation",
            "workflow automation",
            "n8n vs zapier",
            "n8n self hosted",
            "no code automation",
        ],
        trend_regions: vec!["US", "IN"],
        microblog_queries: vec!["n8n workflow", "#n8n", "n8n.io automation"],
        microblog_limit: 25,
    }
}
