mod utils;

use std::sync::Arc;

use undercover::game::state::{Phase, Role, Winner};
use undercover::shared::GameError;
use undercover::websockets::{
    BroadcastGateway, CommandDispatcher, MessageHandler, MessageType, WsGateway,
};

use utils::*;

// ============================================================================
// End-to-end game scenarios
// ============================================================================

#[tokio::test]
async fn civilians_win_by_eliminating_every_infiltrator() {
    let setup = TestSetupBuilder::new().with_five_players().build().await;
    setup.start_with(1).await;

    // Round 1: everyone speaks, then the undercover is voted out.
    setup.finish_clue_round().await;
    let undercover = setup.alive_with_role(Role::Undercover).await[0].clone();
    setup.vote_out(&undercover).await;

    let state = setup.state().await;
    assert_eq!(state.phase, Phase::Playing);
    assert_eq!(state.round_number, 2);
    assert_eq!(state.alive_count(), 4);

    // Round 2: Mr. White is voted out and misses the guess.
    setup.finish_clue_round().await;
    let mr_white = setup.alive_with_role(Role::MrWhite).await[0].clone();
    setup.vote_out(&mr_white).await;
    assert_eq!(setup.state().await.phase, Phase::MrWhiteGuess);

    setup
        .service
        .mr_white_guess(&mr_white, "submarine")
        .await
        .unwrap();

    let state = setup.state().await;
    assert_eq!(state.phase, Phase::Results);
    assert_eq!(state.winner, Some(Winner::Civilians));

    // The end announcement reveals both words to everyone.
    let ended =
        last_payload_of_type(&setup.connections, &setup.players[0], MessageType::GameEnded).await;
    assert_eq!(ended["winner"], "civilians");
    assert_eq!(ended["civilian_word"], "coffee");
    assert_eq!(ended["undercover_word"], "tea");
}

#[tokio::test]
async fn mr_white_wins_with_a_correct_guess() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;
    setup.start_with(1).await;

    setup.finish_clue_round().await;
    let mr_white = setup.alive_with_role(Role::MrWhite).await[0].clone();
    setup.vote_out(&mr_white).await;

    // Guess matching is case-insensitive and trims whitespace.
    setup
        .service
        .mr_white_guess(&mr_white, "  COFFEE ")
        .await
        .unwrap();

    let state = setup.state().await;
    assert_eq!(state.winner, Some(Winner::MrWhite));
    assert_eq!(state.phase, Phase::Results);

    let resolved = last_payload_of_type(
        &setup.connections,
        &setup.players[0],
        MessageType::GuessResolved,
    )
    .await;
    assert_eq!(resolved["correct"], true);
    let ended =
        last_payload_of_type(&setup.connections, &setup.players[0], MessageType::GameEnded).await;
    assert_eq!(ended["winner"], "mrwhite");
}

#[tokio::test]
async fn undercovers_win_once_they_reach_parity() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;
    setup.start_with(1).await;

    // Eliminating a civilian leaves 1 civilian vs undercover + Mr. White.
    setup.finish_clue_round().await;
    let civilian = setup.alive_with_role(Role::Civilian).await[0].clone();
    setup.vote_out(&civilian).await;

    let state = setup.state().await;
    assert_eq!(state.winner, Some(Winner::Undercovers));
    assert_eq!(state.phase, Phase::Results);
}

#[tokio::test]
async fn play_again_returns_to_lobby_and_redeals() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;
    setup.start_with(1).await;
    setup.finish_clue_round().await;
    let civilian = setup.alive_with_role(Role::Civilian).await[0].clone();
    setup.vote_out(&civilian).await;
    assert_eq!(setup.state().await.phase, Phase::Results);

    // Any seated player can ask for a rematch, not just the host.
    setup.service.play_again(&setup.players[2]).await.unwrap();

    let state = setup.state().await;
    assert_eq!(state.phase, Phase::Lobby);
    assert_eq!(state.player_count(), 4);
    assert_eq!(state.round_number, 1);
    assert!(state.clues().is_empty());
    assert_eq!(state.winner, None);
    for seat in state.seats() {
        assert!(seat.is_alive);
        assert_eq!(seat.role, None);
        assert_eq!(seat.word, None);
    }

    // The same room starts cleanly a second time.
    setup.service.start_game(&setup.players[0]).await.unwrap();
    let state = setup.state().await;
    assert_eq!(state.phase, Phase::Playing);
    assert!(state.seats().iter().all(|s| s.role.is_some()));
}

#[tokio::test]
async fn tied_vote_eliminates_nobody() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;
    setup.start_with(1).await;
    setup.finish_clue_round().await;

    let [a, b, c, d] = [
        setup.players[0].clone(),
        setup.players[1].clone(),
        setup.players[2].clone(),
        setup.players[3].clone(),
    ];
    setup.service.submit_vote(&a, &b).await.unwrap();
    setup.service.submit_vote(&b, &a).await.unwrap();
    setup.service.submit_vote(&c, &b).await.unwrap();
    setup.service.submit_vote(&d, &a).await.unwrap();

    let state = setup.state().await;
    assert_eq!(state.phase, Phase::Playing);
    assert_eq!(state.round_number, 2);
    assert_eq!(state.alive_count(), 4);
    assert_eq!(state.eliminated_player_id, None);

    let vote = last_payload_of_type(&setup.connections, &a, MessageType::VoteSubmitted).await;
    assert!(vote["eliminated_player_id"].is_null());
}

#[tokio::test]
async fn concurrent_votes_both_land() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;
    setup.start_with(1).await;
    setup.finish_clue_round().await;

    let voter_a = setup.players[0].clone();
    let voter_b = setup.players[1].clone();
    let target = setup.players[2].clone();

    let (ra, rb) = tokio::join!(
        setup.service.submit_vote(&voter_a, &target),
        setup.service.submit_vote(&voter_b, &target),
    );
    ra.unwrap();
    rb.unwrap();

    assert_eq!(setup.state().await.votes_cast(), 2);
}

// ============================================================================
// Roles, words, and secrecy
// ============================================================================

#[tokio::test]
async fn game_start_deals_roles_and_fixed_words() {
    let setup = TestSetupBuilder::new().with_five_players().build().await;
    setup.start_with(1).await;

    let state = setup.state().await;
    assert_eq!(state.alive_count(), 5);
    assert_eq!(setup.alive_with_role(Role::Undercover).await.len(), 1);
    assert_eq!(setup.alive_with_role(Role::MrWhite).await.len(), 1);
    assert_eq!(setup.alive_with_role(Role::Civilian).await.len(), 3);

    for seat in state.seats() {
        match seat.role.unwrap() {
            Role::Civilian => assert_eq!(seat.word.as_deref(), Some("coffee")),
            Role::Undercover => assert_eq!(seat.word.as_deref(), Some("tea")),
            Role::MrWhite => assert_eq!(seat.word, None),
        }
    }

    // Mr. White never opens the first clue round.
    let first = state.current_turn().unwrap();
    assert_ne!(state.seat(first).unwrap().role, Some(Role::MrWhite));
}

#[tokio::test]
async fn snapshots_conceal_other_players_secrets_until_results() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;
    setup.start_with(1).await;

    let me = &setup.players[0];
    let started = last_payload_of_type(&setup.connections, me, MessageType::GameStarted).await;
    for player in started["state"]["players"].as_array().unwrap() {
        if player["id"] == serde_json::json!(me) {
            assert!(player["role"].is_string());
        } else {
            // Concealed fields are omitted entirely, not nulled.
            assert!(player.get("role").is_none());
            assert!(player.get("word").is_none());
        }
    }

    // Each player privately receives their own role.
    for player_id in &setup.players {
        let role =
            last_payload_of_type(&setup.connections, player_id, MessageType::RoleAssigned).await;
        assert!(role["player"]["role"].is_string());
    }
}

// ============================================================================
// Command rejection
// ============================================================================

#[tokio::test]
async fn rejected_commands_leave_state_untouched() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;

    // Only the host starts games or changes settings.
    assert_eq!(
        setup.service.start_game(&setup.players[1]).await,
        Err(GameError::NotHost)
    );
    assert_eq!(
        setup.service.update_settings(&setup.players[1], 1).await,
        Err(GameError::NotHost)
    );

    // 4 players cannot carry 2 undercovers plus Mr. White.
    assert!(matches!(
        setup.service.update_settings(&setup.players[0], 2).await,
        Err(GameError::InvalidSettings(_))
    ));

    setup.start_with(1).await;

    // Joins are rejected mid-game.
    assert_eq!(
        setup
            .service
            .join_room("id-late", &setup.room_code, "late")
            .await,
        Err(GameError::GameInProgress)
    );

    // Speaking out of turn is rejected without recording the clue.
    let state = setup.state().await;
    let current = state.current_turn().unwrap().clone();
    let interloper = setup
        .players
        .iter()
        .find(|p| **p != current)
        .unwrap()
        .clone();
    assert_eq!(
        setup.service.submit_clue(&interloper, "psst").await,
        Err(GameError::NotYourTurn)
    );
    assert!(setup.state().await.clues().is_empty());

    // Votes come later, and never for yourself.
    assert_eq!(
        setup.service.submit_vote(&current, &interloper).await,
        Err(GameError::WrongPhase)
    );
    setup.finish_clue_round().await;
    assert_eq!(
        setup.service.submit_vote(&current, &current).await,
        Err(GameError::InvalidTarget)
    );

    // Guessing is reserved for an eliminated Mr. White.
    let mr_white = setup.alive_with_role(Role::MrWhite).await[0].clone();
    setup.vote_out(&mr_white).await;
    let civilian = setup.alive_with_role(Role::Civilian).await[0].clone();
    assert_eq!(
        setup.service.mr_white_guess(&civilian, "coffee").await,
        Err(GameError::NotMrWhite)
    );
    assert_eq!(
        setup.service.mr_white_guess(&mr_white, "   ").await,
        Err(GameError::EmptyGuess)
    );
}

#[tokio::test]
async fn duplicate_and_invalid_names_are_rejected() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;

    assert_eq!(
        setup
            .service
            .join_room("id-dup", &setup.room_code, "ALICE")
            .await,
        Err(GameError::NameTaken)
    );
    assert_eq!(
        setup
            .service
            .join_room("id-blank", &setup.room_code, "   ")
            .await,
        Err(GameError::InvalidName)
    );
    assert_eq!(
        setup.service.join_room("id-lost", "ZZZZZZ", "frank").await,
        Err(GameError::RoomNotFound)
    );
}

#[tokio::test]
async fn dispatcher_reports_errors_to_the_initiator_only() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;
    let gateway: Arc<dyn BroadcastGateway> = Arc::new(WsGateway::new(setup.connections.clone()));
    let dispatcher = CommandDispatcher::new(setup.service.clone(), gateway);
    setup.connections.clear_messages().await;

    // Non-host tries to start the game over the wire.
    let frame = r#"{"type":"START_GAME","payload":{},"meta":null}"#;
    dispatcher
        .handle_message(&setup.players[1], frame.to_string())
        .await;

    let error =
        last_payload_of_type(&setup.connections, &setup.players[1], MessageType::Error).await;
    assert_eq!(error["message"], "Only the host can do that");
    assert_eq!(
        count_of_type(&setup.connections, &setup.players[0], MessageType::Error).await,
        0
    );

    // Garbage frames also come back as errors.
    dispatcher
        .handle_message(&setup.players[1], "not json".to_string())
        .await;
    let error =
        last_payload_of_type(&setup.connections, &setup.players[1], MessageType::Error).await;
    assert_eq!(error["message"], "Malformed message");
}

// ============================================================================
// Leaving and disconnects
// ============================================================================

#[tokio::test]
async fn host_leaving_promotes_the_next_player() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;

    setup.service.leave_room(&setup.players[0]).await.unwrap();

    let state = setup.state().await;
    assert_eq!(state.player_count(), 3);
    assert_eq!(state.host_id(), Some(&setup.players[1]));

    let left =
        last_payload_of_type(&setup.connections, &setup.players[1], MessageType::PlayerLeft).await;
    assert_eq!(left["player_id"], serde_json::json!(&setup.players[0]));
}

#[tokio::test]
async fn last_player_leaving_tears_the_room_down() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;

    for player in &setup.players {
        setup.service.leave_room(player).await.unwrap();
    }

    assert_eq!(setup.repository.len().await, 0);
    assert!(matches!(
        setup.service.room_state(&setup.room_code).await,
        Err(GameError::RoomNotFound)
    ));
}

#[tokio::test]
async fn disconnect_during_play_behaves_like_leaving() {
    let setup = TestSetupBuilder::new().with_five_players().build().await;
    setup.start_with(1).await;

    let state = setup.state().await;
    let speaker = state.current_turn().unwrap().clone();
    setup.service.handle_disconnect(&speaker).await;

    let state = setup.state().await;
    assert_eq!(state.player_count(), 4);
    assert_eq!(state.phase, Phase::Playing);
    assert_ne!(state.current_turn(), Some(&speaker));

    // A disconnect from someone in no room is silently ignored.
    setup.service.handle_disconnect("id-nobody").await;
}

#[tokio::test]
async fn infiltrators_leaving_hands_civilians_the_win() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;
    setup.start_with(1).await;

    let undercover = setup.alive_with_role(Role::Undercover).await[0].clone();
    let mr_white = setup.alive_with_role(Role::MrWhite).await[0].clone();
    setup.service.leave_room(&undercover).await.unwrap();
    setup.service.leave_room(&mr_white).await.unwrap();

    let state = setup.state().await;
    assert_eq!(state.winner, Some(Winner::Civilians));
    assert_eq!(state.phase, Phase::Results);

    let remaining = &state.seats()[0].id.clone();
    let ended = last_payload_of_type(&setup.connections, remaining, MessageType::GameEnded).await;
    assert_eq!(ended["winner"], "civilians");
}
