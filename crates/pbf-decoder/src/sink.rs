use pbf_types::Entity;

/// Receives decoded entities one at a time, in wire order.
///
/// ```rust
/// use pbf_decoder::{EntitySink, FnSink};
/// use pbf_types::{Entity, Point};
///
/// let mut count = 0;
/// let mut sink = FnSink(|_: Entity| count += 1);
/// sink.handle(Entity::Point(Point {
///     id: 1,
///     lat: 0.0,
///     lon: 0.0,
///     tags: Vec::new(),
///     metadata: None,
/// }));
/// drop(sink);
/// assert_eq!(count, 1);
/// ```
pub trait EntitySink {
    fn handle(&mut self, entity: Entity);
}

impl EntitySink for Vec<Entity> {
    fn handle(&mut self, entity: Entity) {
        self.push(entity);
    }
}

impl<S: EntitySink + ?Sized> EntitySink for &mut S {
    fn handle(&mut self, entity: Entity) {
        (**self).handle(entity);
    }
}

/// Adapts a closure into an [`EntitySink`].
pub struct FnSink<F>(pub F);

impl<F: FnMut(Entity)> EntitySink for FnSink<F> {
    fn handle(&mut self, entity: Entity) {
        (self.0)(entity);
    }
}
