use super::*;

#[test]
fn rotation_cycles_through_the_pool() {
    let mut rotation = AccountRotation::new(3);
    let seen: Vec<usize> = (0..7).map(|_| rotation.advance()).collect();
    assert_eq!(seen, vec![0, 1, 2, 0, 1, 2, 0]);
}

#[test]
fn empty_pool_behaves_as_single_account() {
    let mut rotation = AccountRotation::new(0);
    assert_eq!(rotation.pool(), 1);
    assert_eq!(rotation.advance(), 0);
    assert_eq!(rotation.advance(), 0);
}
