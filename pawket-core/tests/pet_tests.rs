// tests/pet_tests.rs

use pawket_common::models::pet::StatDeltas;
use pawket_core::Error;
use pawket_core::test_utils::stack::TestStack;

#[tokio::test]
async fn granting_experience_persists_and_pays_the_bonus() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(0).await?;
    let pet = stack.pet_at(user.user_id, 1, 90).await?;

    let (updated, level_up) = stack.pets.grant_experience(pet.pet_id, 30).await?;
    assert!(level_up.leveled_up);
    assert_eq!(level_up.levels_gained, 1);
    assert_eq!(updated.level, 2);
    assert_eq!(updated.experience, 20);

    // (2/10 + 1) * 10 = 10 points, reasoned as a level-up bonus.
    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 10);
    let history = stack.wallet.history(user.user_id, 10).await?;
    assert_eq!(history[0].reason, "level up bonus");
    assert!(stack.wallet.audit(user.user_id).await?);

    // Persisted, not just returned.
    let stored = stack.pets.get_pet(pet.pet_id).await?;
    assert_eq!(stored.level, 2);
    assert_eq!(stored.experience, 20);
    Ok(())
}

#[tokio::test]
async fn multi_level_grant_pays_one_bonus_per_level() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(0).await?;
    let pet = stack.pet_at(user.user_id, 1, 0).await?;

    // Level 1 needs 100, level 2 needs 140; 250 xp gains two levels.
    let (updated, level_up) = stack.pets.grant_experience(pet.pet_id, 250).await?;
    assert_eq!(level_up.levels_gained, 2);
    assert_eq!(updated.level, 3);
    assert_eq!(updated.experience, 10);

    // Bonus for reaching level 2 and level 3: 10 + 10.
    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 20);
    Ok(())
}

#[tokio::test]
async fn adjust_stats_clamps_and_persists() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(0).await?;
    let pet = stack.pets.create_pet(user.user_id, "mochi").await?;

    let updated = stack
        .pets
        .adjust_stats(
            pet.pet_id,
            &StatDeltas {
                hunger: -130,
                mood: 20,
                stamina: -40,
                cleanliness: -10,
            },
        )
        .await?;

    assert_eq!(updated.hunger, 0);
    assert_eq!(updated.mood, 100);
    assert_eq!(updated.stamina, 60);
    assert_eq!(updated.cleanliness, 90);

    let stored = stack.pets.get_pet(pet.pet_id).await?;
    assert_eq!(stored.hunger, 0);
    Ok(())
}

#[tokio::test]
async fn unknown_pet_is_not_found() {
    let stack = TestStack::new();
    let result = stack.pets.get_pet(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}
