use crate::cli::DataArgs;
use crate::infra::{build_service, parse_verification, MatchingService};
use clap::Args;
use roommate_ai::config::AppConfig;
use roommate_ai::error::AppError;
use roommate_ai::workflows::matching::{
    GenerationRequest, HydratedSuggestion, SuggestionStatus, UserId, VerificationPreference,
};

#[derive(Args, Debug)]
pub(crate) struct SuggestArgs {
    /// Seeker to generate suggestions for
    #[arg(long)]
    pub(crate) user: String,
    /// Total group size including the seeker
    #[arg(long, default_value_t = 2)]
    pub(crate) group_size: usize,
    /// Cap on returned suggestions (defaults to the configured value)
    #[arg(long)]
    pub(crate) max_suggestions: Option<usize>,
    /// Minimum verification tier for candidates: any, verified_only, trusted_only
    #[arg(long, value_parser = parse_verification, default_value = "any")]
    pub(crate) verification: VerificationPreference,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Seeker to feature in the demo
    #[arg(long, default_value = "u-ava")]
    pub(crate) user: String,
    /// Total group size including the seeker
    #[arg(long, default_value_t = 2)]
    pub(crate) group_size: usize,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

fn load_service(data: &DataArgs) -> Result<MatchingService, AppError> {
    let config = AppConfig::load()?;
    build_service(
        data.profiles_csv.as_deref(),
        data.lifestyle_csv.as_deref(),
        config.matching,
    )
}

pub(crate) fn run_suggest(args: SuggestArgs) -> Result<(), AppError> {
    let service = load_service(&args.data)?;
    let request = GenerationRequest {
        group_size: args.group_size,
        max_suggestions: args.max_suggestions,
        verification_preference: args.verification,
    };

    let groups = service.generate(&UserId(args.user), &request)?;
    let json = serde_json::to_string_pretty(&groups).map_err(std::io::Error::from)?;
    println!("{json}");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = load_service(&args.data)?;
    let target = UserId(args.user);
    let request = GenerationRequest {
        group_size: args.group_size,
        ..GenerationRequest::default()
    };

    println!("Roommate matching demo");
    println!(
        "- Weights: practical {:.2} | compatibility {:.2} | trust {:.2}",
        service.config().practical_weight,
        service.config().compatibility_weight,
        service.config().trust_weight
    );

    let generated = service.generate(&target, &request)?;
    if generated.is_empty() {
        println!("- No suggestions for {target}: no active profile or no compatible seekers");
        return Ok(());
    }
    println!(
        "- Generated {} suggestion(s) for {target} in groups of {}",
        generated.len(),
        args.group_size
    );

    let hydrated = service.suggestions_with_profiles(&target)?;
    println!("\nActive suggestions");
    for (rank, suggestion) in hydrated.iter().enumerate() {
        render_suggestion(rank + 1, suggestion);
    }

    if let Some(last) = hydrated.last() {
        let dismissed = service.update_status(&last.suggestion_id, SuggestionStatus::Dismissed)?;
        let remaining = service.active_suggestions(&target)?.len();
        println!(
            "\nDismissed {} -> {} active suggestion(s) remain",
            dismissed.id.0, remaining
        );
    }

    Ok(())
}

fn render_suggestion(rank: usize, suggestion: &HydratedSuggestion) {
    let members: Vec<String> = suggestion
        .members
        .iter()
        .map(|member| format!("{} ({}, {})", member.name, member.city, member.province))
        .collect();
    let criteria = &suggestion.match_criteria;
    let cities: Vec<&str> = criteria.common_cities.iter().map(String::as_str).collect();

    println!(
        "{rank:>2}. [{:>3}] {}",
        suggestion.combined_score,
        members.join(", ")
    );
    println!(
        "      practical {} | compatibility {} | trust {}",
        suggestion.practical_score, suggestion.compatibility_score, suggestion.trust_score
    );
    println!(
        "      budget ${}-${} | cities {} | move-in {} to {}",
        criteria.budget_overlap.min,
        criteria.budget_overlap.max,
        cities.join(", "),
        criteria.date_range.earliest,
        criteria.date_range.latest
    );
}
