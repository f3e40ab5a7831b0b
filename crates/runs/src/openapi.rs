//! OpenAPI document served by the Swagger UI.

use utoipa::OpenApi;

use crate::{
    handlers::*,
    models::{
        AthleteInfo, Challenge, ChallengeSummary, CollectibleItem, CompanyDetails, Position, Run,
        RunStatus, Subscription, User, UserDetail, UserRole, UserSummary, UserWithStats,
    },
    types::{
        CollectibleItemRow, CreatePositionRequest, CreateRunRequest, CreateUserRequest,
        EvaluateChallengesResponse, ImportReport, ImportRowError, RateCoachRequest,
        SubscribeRequest, SuccessResponse, UpdateAthleteInfoRequest, UpdateRunRequest,
    },
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Runs API", description = "Run tracking, challenges and collectibles"),
    paths(
        health_check,
        company_details,
        create_run,
        list_runs,
        get_run,
        update_run,
        delete_run,
        start_run,
        stop_run,
        create_position,
        list_positions,
        list_challenges,
        challenges_summary,
        evaluate_athlete_challenges,
        list_collectibles,
        import_collectibles,
        create_user,
        list_users,
        get_user,
        get_athlete_info,
        update_athlete_info,
        subscribe_to_coach,
        rate_coach,
    ),
    components(schemas(
        AthleteInfo,
        Challenge,
        ChallengeSummary,
        CollectibleItem,
        CollectibleItemRow,
        CompanyDetails,
        CreatePositionRequest,
        CreateRunRequest,
        CreateUserRequest,
        EvaluateChallengesResponse,
        ImportReport,
        ImportRowError,
        Position,
        RateCoachRequest,
        Run,
        RunStatus,
        SubscribeRequest,
        Subscription,
        SuccessResponse,
        UpdateAthleteInfoRequest,
        UpdateRunRequest,
        User,
        UserDetail,
        UserRole,
        UserSummary,
        UserWithStats,
    )),
    tags(
        (name = "runs", description = "Runs and their lifecycle"),
        (name = "positions", description = "GPS samples"),
        (name = "challenges", description = "Milestone awards"),
        (name = "collectibles", description = "Collectible items"),
        (name = "users", description = "Athletes and coaches"),
        (name = "athletes", description = "Athlete profiles and coach subscriptions"),
        (name = "stats", description = "Service status")
    )
)]
pub struct ApiDoc;
