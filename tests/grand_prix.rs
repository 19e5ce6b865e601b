//! Integration tests for the event flow: roster, standings, seeding, bracket generation.

use chrono::NaiveDate;
use grand_prix_bracket::{
    apply_result, generate_bracket, import_racers_csv, placement_points, score_heat,
    seed_from_standings, standings, BracketError, GrandPrix, GrandPrixPhase, HeatResult, Racer,
    RacerId,
};

fn grand_prix_with(racers: &[(&str, &str, u32, u32)]) -> GrandPrix {
    let mut gp = GrandPrix::new("Spring Grand Prix");
    for &(first, last, points, heats) in racers {
        let id = gp.add_racer(first, last, None).unwrap();
        gp.set_racer_points(id, points, heats).unwrap();
    }
    gp
}

fn id_of(gp: &GrandPrix, first: &str) -> RacerId {
    gp.racers.iter().find(|r| r.first_name == first).unwrap().id
}

#[test]
fn new_grand_prix_is_in_registration() {
    let gp = GrandPrix::new("Test");
    assert_eq!(gp.phase(), GrandPrixPhase::Registration);
    assert!(gp.racers.is_empty());
    assert!(matches!(gp.bracket(), Err(BracketError::BracketNotFound(id)) if id == gp.id));
}

#[test]
fn add_racer_rejects_duplicate_names() {
    let mut gp = GrandPrix::new("Test");
    gp.add_racer("Ada", "Lovelace", Some("Pit Crew")).unwrap();
    assert!(matches!(
        gp.add_racer(" ada ", "LOVELACE", None),
        Err(BracketError::DuplicateRacerName)
    ));
    assert!(matches!(gp.add_racer("", "Nobody", None), Err(BracketError::InvalidName)));
    assert!(matches!(gp.add_racer("Some", "  ", None), Err(BracketError::InvalidName)));
    assert_eq!(gp.racers.len(), 1);
    assert_eq!(gp.racers[0].club.as_deref(), Some("Pit Crew"));
}

#[test]
fn remove_racer_by_id() {
    let mut gp = grand_prix_with(&[("Ada", "L", 0, 0), ("Bo", "M", 0, 0)]);
    let ada = id_of(&gp, "Ada");
    gp.remove_racer(ada).unwrap();
    assert_eq!(gp.racers.len(), 1);
    assert!(matches!(gp.remove_racer(ada), Err(BracketError::RacerNotFound(id)) if id == ada));
}

#[test]
fn display_name_and_average() {
    let mut r = Racer::new("Grace", "Hopper").with_club("Navy");
    r.points = 21;
    r.heats_ran = 4;
    assert_eq!(r.display_name(), "Grace H");
    assert_eq!(r.average_points(), 5.25);
    assert_eq!(Racer::new("Solo", "").display_name(), "Solo");
    assert_eq!(Racer::new("A", "B").average_points(), 0.0);
}

#[test]
fn standings_order_by_points_then_average_then_name() {
    let gp = grand_prix_with(&[
        ("Cy", "A", 10, 4),
        ("Ann", "B", 12, 6),
        ("Bea", "C", 10, 2),
        ("Abe", "D", 10, 4),
    ]);
    let names: Vec<String> = standings(&gp).into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Ann B", "Bea C", "Abe D", "Cy A"]);
}

#[test]
fn seed_from_standings_assigns_one_to_n() {
    let mut gp = grand_prix_with(&[("Low", "A", 3, 3), ("High", "B", 30, 3), ("Mid", "C", 12, 3)]);
    seed_from_standings(&mut gp).unwrap();
    assert_eq!(gp.get_racer(id_of(&gp, "High")).unwrap().seed, Some(1));
    assert_eq!(gp.get_racer(id_of(&gp, "Mid")).unwrap().seed, Some(2));
    assert_eq!(gp.get_racer(id_of(&gp, "Low")).unwrap().seed, Some(3));

    let mut empty = GrandPrix::new("Empty");
    assert!(matches!(
        seed_from_standings(&mut empty),
        Err(BracketError::InsufficientParticipants { count: 0 })
    ));
}

#[test]
fn generate_requires_seeds() {
    let mut gp = grand_prix_with(&[("Ada", "L", 5, 1), ("Bo", "M", 4, 1)]);
    assert!(matches!(generate_bracket(&mut gp), Err(BracketError::UnseededRacer(_))));
    assert!(gp.bracket.is_none());
}

#[test]
fn generate_bracket_moves_to_bracket_phase() {
    let mut gp = grand_prix_with(&[("Ada", "L", 5, 1), ("Bo", "M", 4, 1), ("Cy", "N", 3, 1)]);
    seed_from_standings(&mut gp).unwrap();
    let ada = id_of(&gp, "Ada");

    let bracket = generate_bracket(&mut gp).unwrap();
    assert_eq!(bracket.participants.len(), 3);
    assert_eq!(bracket.participants[0].id, ada);
    assert_eq!(gp.phase(), GrandPrixPhase::Bracket);

    // Roster is frozen once the bracket exists.
    assert!(matches!(gp.add_racer("Dee", "O", None), Err(BracketError::InvalidState)));
    assert!(matches!(gp.remove_racer(ada), Err(BracketError::InvalidState)));
    assert!(matches!(gp.set_racer_points(ada, 9, 2), Err(BracketError::InvalidState)));
}

#[test]
fn reseeding_discards_the_bracket() {
    let mut gp = grand_prix_with(&[("Ada", "L", 5, 1), ("Bo", "M", 4, 1)]);
    seed_from_standings(&mut gp).unwrap();
    let first = generate_bracket(&mut gp).unwrap().id;

    let (ada, bo) = (id_of(&gp, "Ada"), id_of(&gp, "Bo"));
    gp.set_racer_seed(bo, 1).unwrap();
    gp.set_racer_seed(ada, 2).unwrap();
    assert!(gp.bracket.is_none());
    assert_eq!(gp.phase(), GrandPrixPhase::Registration);
    assert!(matches!(gp.set_racer_seed(ada, 0), Err(BracketError::InvalidState)));

    let second = generate_bracket(&mut gp).unwrap();
    assert_ne!(second.id, first);
    assert_eq!(second.participants[0].id, bo);
}

#[test]
fn phase_completes_with_champion() {
    let mut gp = grand_prix_with(&[("Ada", "L", 5, 1), ("Bo", "M", 4, 1)]);
    seed_from_standings(&mut gp).unwrap();
    generate_bracket(&mut gp).unwrap();
    let (ada, bo) = (id_of(&gp, "Ada"), id_of(&gp, "Bo"));

    let bracket = gp.bracket_mut().unwrap();
    apply_result(bracket, "WB-R1-M1", bo, None).unwrap();
    assert_eq!(gp.phase(), GrandPrixPhase::Bracket);

    let bracket = gp.bracket_mut().unwrap();
    apply_result(bracket, "GF-M1", ada, None).unwrap();
    assert_eq!(gp.phase(), GrandPrixPhase::Bracket);
    let bracket = gp.bracket_mut().unwrap();
    apply_result(bracket, "GF-M2", ada, None).unwrap();

    assert_eq!(gp.phase(), GrandPrixPhase::Completed);
    assert_eq!(gp.bracket().unwrap().placings().champion, Some(ada));
}

#[test]
fn import_roster_from_csv() {
    let mut gp = GrandPrix::new("Test");
    let csv = "firstName,lastName,club,points\n\
               Ada, Lovelace ,Pit Crew,12\n\
               Bo,Matsu,,\n";
    assert_eq!(import_racers_csv(&mut gp, csv.as_bytes()).unwrap(), 2);

    let ada = gp.get_racer(id_of(&gp, "Ada")).unwrap();
    assert_eq!(ada.last_name, "Lovelace");
    assert_eq!(ada.club.as_deref(), Some("Pit Crew"));
    assert_eq!(ada.points, 12);
    let bo = gp.get_racer(id_of(&gp, "Bo")).unwrap();
    assert_eq!((bo.club.as_deref(), bo.points), (None, 0));
}

#[test]
fn import_accepts_snake_case_headers() {
    let mut gp = GrandPrix::new("Test");
    let csv = "first_name,last_name\nAda,Lovelace\n";
    assert_eq!(import_racers_csv(&mut gp, csv.as_bytes()).unwrap(), 1);
}

#[test]
fn import_is_all_or_nothing() {
    let mut gp = grand_prix_with(&[("Ada", "Lovelace", 0, 0)]);

    let duplicate = "firstName,lastName\nBo,Matsu\nADA,lovelace\n";
    assert!(matches!(
        import_racers_csv(&mut gp, duplicate.as_bytes()),
        Err(BracketError::DuplicateRacerName)
    ));
    let repeated = "firstName,lastName\nBo,Matsu\nbo,matsu\n";
    assert!(matches!(
        import_racers_csv(&mut gp, repeated.as_bytes()),
        Err(BracketError::DuplicateRacerName)
    ));
    let bad_points = "firstName,lastName,points\nBo,Matsu,lots\n";
    assert!(matches!(
        import_racers_csv(&mut gp, bad_points.as_bytes()),
        Err(BracketError::InvalidRoster(msg)) if msg.starts_with("row 1")
    ));
    let missing_name = "firstName,lastName\nBo,Matsu\n,Nameless\n";
    assert!(matches!(
        import_racers_csv(&mut gp, missing_name.as_bytes()),
        Err(BracketError::InvalidRoster(msg)) if msg.starts_with("row 2")
    ));
    assert_eq!(gp.racers.len(), 1);
}

#[test]
fn import_refused_after_bracket_generated() {
    let mut gp = grand_prix_with(&[("Ada", "L", 5, 1), ("Bo", "M", 4, 1)]);
    seed_from_standings(&mut gp).unwrap();
    generate_bracket(&mut gp).unwrap();
    let csv = "firstName,lastName\nCy,N\n";
    assert!(matches!(
        import_racers_csv(&mut gp, csv.as_bytes()),
        Err(BracketError::InvalidState)
    ));
}

#[test]
fn grand_prix_round_trips_through_json() {
    let mut gp = grand_prix_with(&[("Ada", "L", 5, 1), ("Bo", "M", 4, 1), ("Cy", "N", 3, 1)]);
    seed_from_standings(&mut gp).unwrap();
    generate_bracket(&mut gp).unwrap();

    let json = serde_json::to_string(&gp).unwrap();
    let back: GrandPrix = serde_json::from_str(&json).unwrap();
    assert_eq!(back.racers, gp.racers);
    assert_eq!(back.bracket.unwrap().matches, gp.bracket.unwrap().matches);
}

fn placed(racers: &[RacerId]) -> Vec<HeatResult> {
    racers
        .iter()
        .enumerate()
        .map(|(i, &racer_id)| HeatResult {
            racer_id,
            placement: i as u32 + 1,
        })
        .collect()
}

#[test]
fn placement_points_table() {
    assert_eq!(placement_points(1), 4);
    assert_eq!(placement_points(2), 3);
    assert_eq!(placement_points(3), 2);
    assert_eq!(placement_points(4), 1);
    assert_eq!(placement_points(5), 0);
    assert_eq!(placement_points(0), 0);
}

#[test]
fn scoring_a_heat_awards_placement_points() {
    let mut gp = grand_prix_with(&[("Ada", "L", 0, 0), ("Bo", "M", 0, 0), ("Cy", "N", 0, 0), ("Dee", "O", 0, 0)]);
    let order = [id_of(&gp, "Cy"), id_of(&gp, "Ada"), id_of(&gp, "Dee"), id_of(&gp, "Bo")];

    let heat = score_heat(&mut gp, &placed(&order)).unwrap();
    assert_eq!(heat.number, 1);
    assert_eq!(heat.results.len(), 4);

    let points: Vec<(u32, u32)> = order
        .iter()
        .map(|&id| gp.get_racer(id).map(|r| (r.points, r.heats_ran)).unwrap())
        .collect();
    assert_eq!(points, vec![(4, 1), (3, 1), (2, 1), (1, 1)]);

    // A short heat: two racers, placements 1 and 2.
    let second = score_heat(&mut gp, &placed(&order[2..])).unwrap();
    assert_eq!(second.number, 2);
    assert_eq!(gp.heats.len(), 2);
    let dee = gp.get_racer(order[2]).unwrap();
    assert_eq!((dee.points, dee.heats_ran), (6, 2));
}

#[test]
fn bad_heat_results_change_nothing() {
    let mut gp = grand_prix_with(&[
        ("Ada", "L", 0, 0),
        ("Bo", "M", 0, 0),
        ("Cy", "N", 0, 0),
        ("Dee", "O", 0, 0),
        ("Eve", "P", 0, 0),
    ]);
    let (ada, bo, cy) = (id_of(&gp, "Ada"), id_of(&gp, "Bo"), id_of(&gp, "Cy"));
    let racers_before = gp.racers.clone();
    let result = |racer_id, placement| HeatResult { racer_id, placement };

    assert!(matches!(
        score_heat(&mut gp, &[result(ada, 1), result(uuid::Uuid::new_v4(), 2)]),
        Err(BracketError::RacerNotFound(_))
    ));
    assert!(matches!(
        score_heat(&mut gp, &[result(ada, 1), result(ada, 2)]),
        Err(BracketError::InvalidHeat(_))
    ));
    assert!(matches!(
        score_heat(&mut gp, &[result(ada, 0), result(bo, 1)]),
        Err(BracketError::InvalidHeat(_))
    ));
    assert!(matches!(
        score_heat(&mut gp, &[result(ada, 1), result(bo, 1), result(cy, 2)]),
        Err(BracketError::InvalidHeat(_))
    ));
    assert!(matches!(
        score_heat(&mut gp, &[result(ada, 1), result(bo, 3)]),
        Err(BracketError::InvalidHeat(_))
    ));
    assert!(matches!(score_heat(&mut gp, &[]), Err(BracketError::InvalidHeat(_))));
    let everyone: Vec<RacerId> = gp.racers.iter().map(|r| r.id).collect();
    assert!(matches!(
        score_heat(&mut gp, &placed(&everyone)),
        Err(BracketError::InvalidHeat(_))
    ));

    assert_eq!(gp.racers, racers_before);
    assert!(gp.heats.is_empty());
}

#[test]
fn heat_scores_drive_standings_and_seeds() {
    let mut gp = grand_prix_with(&[("Ada", "L", 0, 0), ("Bo", "M", 0, 0), ("Cy", "N", 0, 0), ("Dee", "O", 0, 0)]);
    let (ada, bo, cy, dee) = (id_of(&gp, "Ada"), id_of(&gp, "Bo"), id_of(&gp, "Cy"), id_of(&gp, "Dee"));

    // Bo 4+3 = 7, Cy 3+4 = 7, Dee 2+2 = 4, Ada 1+1 = 2.
    score_heat(&mut gp, &placed(&[bo, cy, dee, ada])).unwrap();
    score_heat(&mut gp, &placed(&[cy, bo, dee, ada])).unwrap();

    let table: Vec<(RacerId, u32)> = standings(&gp).iter().map(|s| (s.racer_id, s.total_points)).collect();
    assert_eq!(table, vec![(bo, 7), (cy, 7), (dee, 4), (ada, 2)]);

    seed_from_standings(&mut gp).unwrap();
    let bracket = generate_bracket(&mut gp).unwrap();
    let order: Vec<RacerId> = bracket.participants.iter().map(|p| p.id).collect();
    assert_eq!(order, vec![bo, cy, dee, ada]);

    assert!(matches!(
        score_heat(&mut gp, &placed(&[ada, bo])),
        Err(BracketError::InvalidState)
    ));
}

#[test]
fn shared_seeds_fall_back_to_roster_order() {
    let mut gp = grand_prix_with(&[("Ada", "L", 0, 0), ("Bo", "M", 0, 0), ("Cy", "N", 0, 0)]);
    let (ada, bo, cy) = (id_of(&gp, "Ada"), id_of(&gp, "Bo"), id_of(&gp, "Cy"));
    gp.set_racer_seed(cy, 1).unwrap();
    gp.set_racer_seed(bo, 2).unwrap();
    gp.set_racer_seed(ada, 2).unwrap();

    let bracket = generate_bracket(&mut gp).unwrap();
    let order: Vec<RacerId> = bracket.participants.iter().map(|p| p.id).collect();
    assert_eq!(order, vec![cy, ada, bo]);
}

#[test]
fn event_details_can_be_edited() {
    let mut gp = GrandPrix::new("Spring Grand Prix");
    let date = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
    gp.update_details(Some(" Summer Grand Prix "), None, Some("Hall B".to_string()), Some(date))
        .unwrap();
    assert_eq!(gp.name, "Summer Grand Prix");
    assert_eq!(gp.location.as_deref(), Some("Hall B"));
    assert_eq!(gp.date, date);
    assert_eq!(gp.description, None);

    gp.update_details(None, Some("Pack 12".to_string()), None, None).unwrap();
    assert_eq!(gp.name, "Summer Grand Prix");
    assert_eq!(gp.description.as_deref(), Some("Pack 12"));

    assert!(matches!(gp.update_details(Some("  "), None, None, None), Err(BracketError::InvalidName)));
    assert_eq!(gp.name, "Summer Grand Prix");
}
