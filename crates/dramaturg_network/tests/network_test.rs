//! Conflict network invariants and snapshot isolation.

use dramaturg_error::NetworkErrorKind;
use dramaturg_network::{
    CharacterProfile, ConflictDraft, ConflictNetwork, ConflictPhase, RelationshipDraft,
    RelationshipType,
};
use serde_json::json;

fn cast() -> (ConflictNetwork, String, String, String) {
    let mut network = ConflictNetwork::new("test");
    let layla = network.add_character("Layla", None);
    let omar = network.add_character("Omar", None);
    let nour = network.add_character("Nour", None);
    (network, layla, omar, nour)
}

fn rel(source: &str, target: &str) -> RelationshipDraft {
    RelationshipDraft {
        source: source.to_string(),
        target: target.to_string(),
        kind: RelationshipType::Friendship,
        strength: 5,
        ..Default::default()
    }
}

#[test]
fn test_ids_follow_insertion_order() {
    let (network, layla, omar, nour) = cast();
    assert_eq!(layla, "char_000001");
    assert_eq!(omar, "char_000002");
    assert_eq!(nour, "char_000003");

    let names: Vec<_> = network.characters().values().map(|c| c.name().clone()).collect();
    assert_eq!(names, vec!["Layla", "Omar", "Nour"]);
}

#[test]
fn test_large_casts_keep_insertion_order() {
    let mut network = ConflictNetwork::new("crowd");
    let ids: Vec<String> = (1..=1_200)
        .map(|n| network.add_character(&format!("Extra {n}"), None))
        .collect();

    assert_eq!(ids[999], "char_001000");
    let keys: Vec<String> = network.characters().keys().cloned().collect();
    assert_eq!(keys, ids);
}

#[test]
fn test_duplicate_names_reuse_id() {
    let (mut network, layla, _, _) = cast();
    assert_eq!(network.add_character("  layla ", None), layla);
    assert_eq!(network.summary().characters_count, 3);
}

#[test]
fn test_self_relationship_rejected() {
    let (mut network, layla, _, _) = cast();
    let err = network.add_relationship(rel(&layla, &layla)).unwrap_err();
    assert!(matches!(err.kind, NetworkErrorKind::SelfRelationship(_)));
    assert!(network.relationships().is_empty());
}

#[test]
fn test_unknown_endpoint_rejected() {
    let (mut network, layla, _, _) = cast();
    let err = network.add_relationship(rel(&layla, "char_999")).unwrap_err();
    assert!(matches!(err.kind, NetworkErrorKind::UnknownCharacter(ref id) if id == "char_999"));
}

#[test]
fn test_every_edge_references_existing_characters() -> anyhow::Result<()> {
    let (mut network, layla, omar, nour) = cast();
    network.add_relationship(rel(&layla, &omar))?;
    network.add_relationship(rel(&omar, &nour))?;
    let _ = network.add_relationship(rel(&nour, "ghost"));
    let _ = network.add_relationship(rel(&nour, &nour));

    for relationship in network.relationships().values() {
        assert_ne!(relationship.source(), relationship.target());
        assert!(network.characters().contains_key(relationship.source()));
        assert!(network.characters().contains_key(relationship.target()));
    }
    assert_eq!(network.relationships().len(), 2);
    Ok(())
}

#[test]
fn test_strength_is_clamped() -> anyhow::Result<()> {
    let (mut network, layla, omar, _) = cast();
    let mut draft = rel(&layla, &omar);
    draft.strength = 42;
    let id = network.add_relationship(draft)?;
    assert_eq!(*network.relationships()[&id].strength(), 10);
    Ok(())
}

#[test]
fn test_conflict_validation() -> anyhow::Result<()> {
    let (mut network, layla, omar, _) = cast();
    let rel_id = network.add_relationship(rel(&layla, &omar))?;

    let empty = network.add_conflict(ConflictDraft {
        name: "Nothing".into(),
        ..Default::default()
    });
    assert!(matches!(empty.unwrap_err().kind, NetworkErrorKind::EmptyConflict(_)));

    let unknown = network.add_conflict(ConflictDraft {
        name: "Ghost".into(),
        involved_characters: vec![layla.clone(), "char_404".into()],
        ..Default::default()
    });
    assert!(unknown.is_err());

    let id = network.add_conflict(ConflictDraft {
        name: "Inheritance".into(),
        involved_characters: vec![layla.clone(), omar.clone(), layla.clone()],
        related_relationships: vec![rel_id.clone(), "rel_999".into()],
        ..Default::default()
    })?;
    let conflict = &network.conflicts()[&id];
    assert_eq!(conflict.involved_characters(), &vec![layla.clone(), omar.clone()]);
    assert_eq!(conflict.related_relationships(), &vec![rel_id]);
    assert_eq!(network.involvement(&layla), 2);
    Ok(())
}

#[test]
fn test_snapshot_isolated_from_later_mutation() -> anyhow::Result<()> {
    let (mut network, layla, omar, nour) = cast();
    network.add_relationship(rel(&layla, &omar))?;
    let conflict = network.add_conflict(ConflictDraft {
        name: "Feud".into(),
        involved_characters: vec![layla.clone(), omar.clone()],
        ..Default::default()
    })?;

    let before = network.create_snapshot("Initial").clone();

    network.add_relationship(rel(&omar, &nour))?;
    network.update_conflict_phase(&conflict, ConflictPhase::Climax)?;
    network.enrich_character_metadata(&layla, "arc", json!("tragic"))?;

    let recorded = &network.snapshots()[0];
    assert_eq!(recorded, &before);
    assert_eq!(recorded.relationships().len(), 1);
    assert_eq!(*recorded.conflicts()[&conflict].phase(), ConflictPhase::Latent);
    assert!(recorded.characters()[&layla].metadata().is_empty());

    let after = network.create_snapshot("After").clone();
    assert_eq!(*after.index(), 1);
    assert_eq!(after.relationships().len(), 2);
    assert_eq!(*after.conflicts()[&conflict].phase(), ConflictPhase::Climax);
    Ok(())
}

#[test]
fn test_unknown_conflict_phase_update() {
    let (mut network, _, _, _) = cast();
    let err = network
        .update_conflict_phase("conf_000001", ConflictPhase::Climax)
        .unwrap_err();
    assert!(matches!(err.kind, NetworkErrorKind::UnknownConflict(_)));
}

#[test]
fn test_serializes_key_ordered_camel_case() -> anyhow::Result<()> {
    let mut network = ConflictNetwork::new("test");
    let id = network.add_character(
        "Layla",
        Some(CharacterProfile::new(vec!["brave".into()], vec![], "rises")),
    );
    let value = serde_json::to_value(&network)?;
    assert_eq!(value["characters"][&id]["profile"]["personalityTraits"][0], "brave");
    assert!(value.get("createdAt").is_some());
    Ok(())
}
